//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → builders, gas estimators and clients constructed from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Envelope defaults (version, chain id, method) are configuration, not
//!   constants buried in the builders

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AdapterConfig, FilecoinConfig, FilecoinNetwork, IotexConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
