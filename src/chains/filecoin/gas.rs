use std::collections::HashMap;

use alloy::primitives::U256;

use crate::blockchain::{GasPolicy, TxType};
use crate::config::FilecoinConfig;

/// Gas policy from the configured Filecoin defaults. The price is the fee
/// cap the builder writes into `GasFeeCap`.
pub fn gas_policy(config: &FilecoinConfig) -> GasPolicy {
    let mut limits = HashMap::new();
    limits.insert(TxType::Transfer, U256::from(config.transfer_gas_limit));
    limits.insert(TxType::ContractCall, U256::from(config.execution_gas_limit));
    GasPolicy::new(U256::from(config.gas_price), limits)
}
