//! Chain adapters for IoTeX and Filecoin.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!   TxParams ────▶│  blockchain (chain-agnostic contract)        │
//!                 │  TxBuilder → Tx → sign → serialize           │
//!                 └───────────────┬──────────────────────────────┘
//!                                 │ implemented by
//!                 ┌───────────────┴──────────────────────────────┐
//!                 │  chains::iotex          chains::filecoin     │
//!                 │  bech32 / protobuf      base32 / DAG-CBOR    │
//!                 │  gRPC client            Lotus JSON-RPC       │
//!                 └───────────────┬──────────────────────────────┘
//!                                 │ dial / redial
//!                 ┌───────────────┴──────────────────────────────┐
//!                 │  net::LazyConnection (one shared connection) │
//!                 └──────────────────────────────────────────────┘
//!
//!   config (TOML defaults)   observability (tracing + metrics)
//! ```
//!
//! Callers own their keys: the crate hands out sighashes and accepts
//! signatures, it never signs.

pub mod blockchain;
pub mod chains;
pub mod config;
pub mod net;
pub mod observability;

pub use blockchain::{
    Address, ChainError, ChainResult, Client, ClientOptions, GasEstimator, Tx, TxBuilder, TxParams,
};
pub use chains::filecoin::{FilecoinClient, FilecoinTx, FilecoinTxBuilder};
pub use chains::iotex::{IotexClient, IotexTx, IotexTxBuilder};
pub use config::AdapterConfig;
