//! Transaction lifecycle contract.
//!
//! # Lifecycle
//! ```text
//! TxBuilder::build_tx      → unsigned Tx
//! Tx::sighashes            → digests the caller signs
//! Tx::sign                 → signed Tx (exactly once)
//! Tx::serialize            → wire bytes handed to a Client
//! Tx::deserialize          → Tx rebuilt from bytes returned by a lookup
//! ```

use alloy::primitives::{Bytes, B256, U256};

use crate::blockchain::types::{Address, ChainResult, Signature65};

/// A chain transaction with a single sign transition.
///
/// Accessors are lock-free. `sign` takes `&self` so a transaction can be
/// shared between tasks; implementations guard the transition so that at
/// most one call ever succeeds.
pub trait Tx: Send + Sync {
    /// Chain-specific identifier derived from [`Tx::serialize`].
    fn hash(&self) -> ChainResult<Vec<u8>>;

    fn from(&self) -> &Address;

    fn to(&self) -> &Address;

    fn value(&self) -> U256;

    fn nonce(&self) -> U256;

    fn payload(&self) -> &Bytes;

    /// One digest per required signature. Single-signer chains return
    /// exactly one.
    fn sighashes(&self) -> ChainResult<Vec<B256>>;

    /// Bind a signature and public key to the transaction.
    ///
    /// Fails with [`ChainError::AlreadySigned`](crate::blockchain::ChainError::AlreadySigned)
    /// if a signature is already attached; the first signature is never
    /// replaced.
    fn sign(&self, signature: &Signature65, public_key: &[u8]) -> ChainResult<()>;

    fn is_signed(&self) -> bool;

    /// Encode to the bytes the chain's node accepts.
    fn serialize(&self) -> ChainResult<Vec<u8>>;

    /// Rebuild a transaction from wire bytes.
    fn deserialize(bytes: &[u8]) -> ChainResult<Self>
    where
        Self: Sized;
}

/// Chain-agnostic transfer intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxParams {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub payload: Bytes,
}

/// Builds unsigned transactions from intent.
pub trait TxBuilder: Send + Sync {
    type Tx: Tx;

    /// Fails with [`ChainError::Construction`](crate::blockchain::ChainError::Construction)
    /// when an address does not parse or a numeric field overflows the
    /// chain's native width.
    fn build_tx(&self, params: TxParams) -> ChainResult<Self::Tx>;
}

/// Checked narrowing of a `U256` into a `u64` field.
pub(crate) fn u256_to_u64(value: U256, field: &str) -> ChainResult<u64> {
    u64::try_from(value).map_err(|_| {
        crate::blockchain::ChainError::Construction(format!(
            "{} {} exceeds u64 range",
            field, value
        ))
    })
}
