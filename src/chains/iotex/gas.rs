use std::collections::HashMap;

use alloy::primitives::U256;

use crate::blockchain::{GasPolicy, TxType};
use crate::config::IotexConfig;

/// Gas policy from the configured IoTeX defaults.
pub fn gas_policy(config: &IotexConfig) -> GasPolicy {
    let mut limits = HashMap::new();
    limits.insert(TxType::Transfer, U256::from(config.transfer_gas_limit));
    limits.insert(TxType::ContractCall, U256::from(config.execution_gas_limit));
    GasPolicy::new(U256::from(config.gas_price), limits)
}
