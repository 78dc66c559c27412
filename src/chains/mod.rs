//! Per-chain implementations of the [`crate::blockchain`] contract.
//!
//! Each chain module provides an address codec, a transaction type with its
//! builder, a gas policy and a client.

pub mod crypto;
pub mod filecoin;
pub mod iotex;

#[cfg(test)]
pub(crate) mod testutil;

use crate::blockchain::{ChainError, ChainResult};
use crate::observability::metrics::Outcome;

/// Blocks on top of (and including) the one at `height`, or 0 when the tip
/// has not reached it.
pub(crate) fn confirmations(tip: u64, height: u64) -> u64 {
    tip.checked_sub(height).map_or(0, |depth| depth + 1)
}

/// Metrics label for a finished lookup.
pub(crate) fn lookup_outcome<T>(result: &ChainResult<T>) -> Outcome {
    match result {
        Ok(_) => Outcome::Ok,
        Err(ChainError::NotFound(_)) => Outcome::NotFound,
        Err(_) => Outcome::Error,
    }
}
