//! IoTeX adapter.
//!
//! # Wire format
//! ```text
//! ActionCore { version, nonce, gasLimit, gasPrice, chainID, transfer }
//!     sighash = blake2b-256(protobuf(ActionCore))
//! Action { core, senderPubKey (65 bytes), signature (r || s || v) }
//!     hash    = blake2b-256(protobuf(Action))
//! ```
//!
//! Submission and lookup go through `iotexapi.APIService` over gRPC.

pub mod address;
pub mod client;
pub mod gas;
pub mod proto;
pub mod transaction;

pub use address::AddressCodec;
pub use client::{GrpcDialer, IotexClient, IotexConnection};
pub use gas::gas_policy;
pub use transaction::{IotexTx, IotexTxBuilder};

/// Chain label used in logs and metrics.
pub const CHAIN: &str = "iotex";
