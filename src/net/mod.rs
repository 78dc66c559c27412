//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Client call
//!     → connection.rs (connect-or-reuse under one lock)
//!     → Dialer (gRPC channel or JSON-RPC HTTP client)
//!     → RPC issued on the cloned handle, lock released
//! ```
//!
//! # Design Decisions
//! - One physical connection per client, not a pool
//! - Staleness is detected lazily, on the next connect
//! - Timeouts and retries belong to the caller

pub mod connection;

pub use connection::{Connection, ConnectionId, ConnectionState, Dialer, LazyConnection, ShutdownFlag};
