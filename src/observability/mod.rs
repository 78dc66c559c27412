//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Adapters produce:
//!     → tracing events (dials, redials, submissions, lookups)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! The embedding application:
//!     → logging.rs (installs the subscriber once)
//!     → installs whatever metrics recorder it exports with
//! ```
//!
//! # Design Decisions
//! - Structured fields, never formatted key material
//! - Metrics are no-ops until the host installs a recorder

pub mod logging;
pub mod metrics;
