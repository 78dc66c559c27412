//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the adapters.
//! All types derive Serde traits for deserialization from config files, and
//! every chain-specific default the builders and estimators rely on lives
//! here rather than in the adapter code.

use serde::{Deserialize, Serialize};

use crate::blockchain::ClientOptions;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdapterConfig {
    /// IoTeX adapter settings.
    pub iotex: IotexConfig,

    /// Filecoin adapter settings.
    pub filecoin: FilecoinConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// IoTeX adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IotexConfig {
    /// gRPC endpoint (e.g., "api.iotex.one:443").
    pub endpoint: String,

    /// Dial with TLS.
    pub secure: bool,

    /// Optional bearer token sent as gRPC metadata.
    pub auth_token: Option<String>,

    /// Chain ID written into every envelope (1 = mainnet, 2 = testnet).
    pub chain_id: u32,

    /// Envelope version written into every envelope.
    pub envelope_version: u32,

    /// Default gas price in Rau.
    pub gas_price: u64,

    /// Gas limit for plain transfers.
    pub transfer_gas_limit: u64,

    /// Gas limit for transfers carrying a payload.
    pub execution_gas_limit: u64,
}

impl Default for IotexConfig {
    fn default() -> Self {
        Self {
            endpoint: "api.iotex.one:443".to_string(),
            secure: true,
            auth_token: None,
            chain_id: 1,
            envelope_version: 1,
            gas_price: 1_000_000_000_000, // 1 Qev
            transfer_gas_limit: 10_000,
            execution_gas_limit: 1_000_000,
        }
    }
}

impl From<&IotexConfig> for ClientOptions {
    fn from(config: &IotexConfig) -> Self {
        ClientOptions {
            endpoint: config.endpoint.clone(),
            secure: config.secure,
            auth_token: config.auth_token.clone(),
        }
    }
}

/// Filecoin network, selecting the address prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilecoinNetwork {
    /// `f` addresses.
    Mainnet,
    /// `t` addresses.
    Testnet,
}

impl FilecoinNetwork {
    pub fn prefix(&self) -> char {
        match self {
            FilecoinNetwork::Mainnet => 'f',
            FilecoinNetwork::Testnet => 't',
        }
    }
}

/// Filecoin adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilecoinConfig {
    /// Lotus JSON-RPC endpoint URL.
    pub endpoint: String,

    /// Use HTTPS when the endpoint carries no scheme.
    pub secure: bool,

    /// Lotus API token (sent as `Authorization: Bearer`).
    pub auth_token: Option<String>,

    /// Network used when encoding addresses.
    pub network: FilecoinNetwork,

    /// Actor method number for built messages (0 = plain send).
    pub default_method: u64,

    /// Default gas fee cap in attoFIL.
    pub gas_price: u64,

    /// Gas premium in attoFIL written into every message.
    pub gas_premium: u64,

    /// Gas limit for plain sends.
    pub transfer_gas_limit: u64,

    /// Gas limit for messages carrying params.
    pub execution_gas_limit: u64,
}

impl Default for FilecoinConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:1234/rpc/v0".to_string(),
            secure: false,
            auth_token: None,
            network: FilecoinNetwork::Mainnet,
            default_method: 0,
            gas_price: 100_000_000_000,
            gas_premium: 100_000,
            transfer_gas_limit: 1_000_000,
            execution_gas_limit: 10_000_000,
        }
    }
}

impl From<&FilecoinConfig> for ClientOptions {
    fn from(config: &FilecoinConfig) -> Self {
        ClientOptions {
            endpoint: config.endpoint.clone(),
            secure: config.secure,
            auth_token: config.auth_token.clone(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
