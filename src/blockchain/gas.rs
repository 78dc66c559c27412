//! Gas estimation.
//!
//! # Responsibilities
//! - Report a gas price and per-transaction-type gas limit
//! - Optionally poll a node for the price, falling back to the last value
//!   that succeeded instead of failing transaction construction

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::U256;
use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::blockchain::types::{ChainError, ChainResult};
use crate::observability::metrics;

/// Kind of transaction a gas limit is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    /// Plain value transfer.
    Transfer,
    /// Transfer carrying a contract call payload.
    ContractCall,
}

/// Gas price estimation and limit lookup.
#[async_trait]
pub trait GasEstimator: Send + Sync {
    async fn estimate_gas_price(&self) -> ChainResult<U256>;

    fn estimate_gas_limit(&self, tx_type: TxType) -> ChainResult<U256>;
}

/// Immutable gas price and limit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    gas_price: U256,
    limits: HashMap<TxType, U256>,
}

impl GasPolicy {
    pub fn new(gas_price: U256, limits: HashMap<TxType, U256>) -> Self {
        Self { gas_price, limits }
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn gas_limit(&self, tx_type: TxType) -> ChainResult<U256> {
        self.limits.get(&tx_type).copied().ok_or_else(|| {
            ChainError::Construction(format!("no gas limit configured for {:?}", tx_type))
        })
    }
}

/// Returns the configured policy values without touching the network.
#[derive(Debug, Clone)]
pub struct StaticGasEstimator {
    policy: GasPolicy,
}

impl StaticGasEstimator {
    pub fn new(policy: GasPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl GasEstimator for StaticGasEstimator {
    async fn estimate_gas_price(&self) -> ChainResult<U256> {
        Ok(self.policy.gas_price())
    }

    fn estimate_gas_limit(&self, tx_type: TxType) -> ChainResult<U256> {
        self.policy.gas_limit(tx_type)
    }
}

/// A node that can suggest the current gas price.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    fn chain(&self) -> &'static str;

    async fn suggest_gas_price(&self) -> ChainResult<U256>;
}

/// Polls a [`GasPriceSource`] and remembers the last good answer.
///
/// The policy's price seeds the last-known-good value, so a node that has
/// never answered still yields a usable price.
pub struct PollingGasEstimator<S> {
    source: S,
    policy: GasPolicy,
    last_known_good: ArcSwap<U256>,
}

impl<S: GasPriceSource> PollingGasEstimator<S> {
    pub fn new(source: S, policy: GasPolicy) -> Self {
        let seed = policy.gas_price();
        Self {
            source,
            policy,
            last_known_good: ArcSwap::from_pointee(seed),
        }
    }

    /// The price that will be returned if the next poll fails.
    pub fn last_known_good(&self) -> U256 {
        **self.last_known_good.load()
    }
}

#[async_trait]
impl<S: GasPriceSource> GasEstimator for PollingGasEstimator<S> {
    async fn estimate_gas_price(&self) -> ChainResult<U256> {
        match self.source.suggest_gas_price().await {
            Ok(price) => {
                self.last_known_good.store(Arc::new(price));
                Ok(price)
            }
            Err(e) => {
                let fallback = self.last_known_good();
                tracing::warn!(
                    chain = self.source.chain(),
                    error = %e,
                    fallback = %fallback,
                    "Gas price poll failed, using last known good value"
                );
                metrics::record_gas_price_fallback(self.source.chain());
                Ok(fallback)
            }
        }
    }

    fn estimate_gas_limit(&self, tx_type: TxType) -> ChainResult<U256> {
        self.policy.gas_limit(tx_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    fn policy() -> GasPolicy {
        let mut limits = HashMap::new();
        limits.insert(TxType::Transfer, U256::from(10_000));
        GasPolicy::new(U256::from(1_000_000_000_000u64), limits)
    }

    struct FlakySource {
        fail: AtomicBool,
        next: AtomicU64,
    }

    #[async_trait]
    impl GasPriceSource for FlakySource {
        fn chain(&self) -> &'static str {
            "test"
        }

        async fn suggest_gas_price(&self) -> ChainResult<U256> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ChainError::Rpc("node unavailable".to_string()));
            }
            Ok(U256::from(self.next.load(Ordering::SeqCst)))
        }
    }

    #[tokio::test]
    async fn test_static_estimator() {
        let estimator = StaticGasEstimator::new(policy());
        assert_eq!(
            estimator.estimate_gas_price().await.unwrap(),
            U256::from(1_000_000_000_000u64)
        );
        assert_eq!(
            estimator.estimate_gas_limit(TxType::Transfer).unwrap(),
            U256::from(10_000)
        );
        assert!(matches!(
            estimator.estimate_gas_limit(TxType::ContractCall),
            Err(ChainError::Construction(_))
        ));
    }

    #[tokio::test]
    async fn test_polling_estimator_falls_back() {
        let source = FlakySource {
            fail: AtomicBool::new(true),
            next: AtomicU64::new(42),
        };
        let estimator = PollingGasEstimator::new(source, policy());

        // Never answered: seeded value
        assert_eq!(
            estimator.estimate_gas_price().await.unwrap(),
            U256::from(1_000_000_000_000u64)
        );

        estimator.source.fail.store(false, Ordering::SeqCst);
        assert_eq!(estimator.estimate_gas_price().await.unwrap(), U256::from(42));

        estimator.source.fail.store(true, Ordering::SeqCst);
        estimator.source.next.store(99, Ordering::SeqCst);
        assert_eq!(estimator.estimate_gas_price().await.unwrap(), U256::from(42));
        assert_eq!(estimator.last_known_good(), U256::from(42));
    }
}
