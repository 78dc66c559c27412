//! Chain-agnostic adapter contract.
//!
//! # Data Flow
//! ```text
//! caller intent (TxParams)
//!     → transaction.rs (TxBuilder → unsigned Tx)
//!     → caller signs Tx::sighashes() with its own key
//!     → transaction.rs (Tx::sign, exactly once)
//!     → client.rs (submit_tx / tx lookup over a lazy connection)
//! ```
//!
//! # Security Constraints
//! - Key material never enters this crate; only signatures and public keys
//! - The sighash is computed over the same canonical encoding the node verifies

pub mod address;
pub mod client;
pub mod gas;
pub mod transaction;
pub mod types;

pub use address::{AddressDecoder, AddressEncodeDecoder, AddressEncoder};
pub use client::{Client, ClientOptions};
pub use gas::{GasEstimator, GasPolicy, GasPriceSource, PollingGasEstimator, StaticGasEstimator, TxType};
pub use transaction::{Tx, TxBuilder, TxParams};
pub use types::{Address, ChainError, ChainResult, DecodingError, RawAddress, Signature65};
