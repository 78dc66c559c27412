//! Chain-agnostic types and error definitions.

use std::fmt;

use alloy::primitives::FixedBytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 65-byte recoverable secp256k1 signature (`r || s || v`).
pub type Signature65 = FixedBytes<65>;

/// Chain-native account identifier in its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a chain-native address string. No validation is performed.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded byte form of an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawAddress(Vec<u8>);

impl RawAddress {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for RawAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reasons a transaction could not be reconstructed from wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// The envelope bytes do not parse as the chain's wire format.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A numeric field could not be parsed or overflows `U256`.
    #[error("unparsable numeric field `{field}`: {value:?}")]
    UnparsableNumeric { field: &'static str, value: String },

    /// The sender address cannot be derived from the public key or signature.
    #[error("unrecoverable sender: {0}")]
    UnrecoverableSender(String),
}

/// Errors that can occur while building, encoding or transporting transactions.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Malformed address or input string.
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid build parameters or numeric overflow at the chain boundary.
    #[error("Construction error: {0}")]
    Construction(String),

    /// A serialization precondition was not met.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Wire bytes could not be decoded.
    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),

    /// `sign` was called on a transaction that already carries a signature.
    #[error("Transaction already signed")]
    AlreadySigned,

    /// The node rejected the submission, or the transport failed mid-call.
    /// The message is the remote reason, unmodified.
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// A lookup matched zero or more than one record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Dialing the node failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A lookup-side RPC failed for a reason other than "not found".
    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Result type for chain adapter operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Normalize an Ethereum-style recovery byte (27/28) to the 0/1 form both
/// supported chains put on the wire.
pub(crate) fn normalize_recovery_id(signature: &Signature65) -> Signature65 {
    let mut normalized = *signature;
    if normalized[64] >= 27 {
        normalized[64] -= 27;
    }
    normalized
}
