//! Filecoin adapter.
//!
//! # Wire format
//! ```text
//! Message (DAG-CBOR array)
//!     sighash = blake2b-256(CID(Message))
//! SignedMessage = [Message, 0x01 || r || s || v]
//!     hash    = CID(serialized bytes)
//! ```
//!
//! Submission and lookup go through a Lotus node's JSON-RPC API.

pub mod address;
pub mod cid;
pub mod client;
pub mod gas;
pub mod lotus;
pub mod message;
pub mod transaction;

pub use address::{AddressCodec, Protocol};
pub use cid::Cid;
pub use client::{FilecoinClient, HttpDialer, LotusConnection};
pub use gas::gas_policy;
pub use message::Message;
pub use transaction::{FilecoinTx, FilecoinTxBuilder};

/// Chain label used in logs and metrics.
pub const CHAIN: &str = "filecoin";
