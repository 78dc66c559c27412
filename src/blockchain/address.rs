//! Address codec contract.
//!
//! Each chain converts between its human-facing address string and the raw
//! bytes that appear inside its transaction envelope. Both directions are
//! pure and must reject malformed prefixes and checksums instead of
//! truncating.

use crate::blockchain::types::{Address, ChainResult, RawAddress};

/// Decodes a chain-native address string into raw bytes.
pub trait AddressDecoder: Send + Sync {
    /// Fails with [`ChainError::Format`](crate::blockchain::ChainError::Format)
    /// when `address` is not a valid encoding for this chain.
    fn decode_address(&self, address: &Address) -> ChainResult<RawAddress>;
}

/// Encodes raw address bytes into the chain-native string.
pub trait AddressEncoder: Send + Sync {
    fn encode_address(&self, raw: &RawAddress) -> ChainResult<Address>;
}

/// Convenience bound for codecs that work in both directions.
pub trait AddressEncodeDecoder: AddressEncoder + AddressDecoder {}

impl<T: AddressEncoder + AddressDecoder> AddressEncodeDecoder for T {}
