//! End-to-end transaction lifecycle through the chain-agnostic traits.

use alloy::primitives::{Bytes, U256};
use chain_adapter::blockchain::{
    Address, ChainError, GasEstimator, PollingGasEstimator, Tx, TxBuilder, TxParams, TxType,
};
use chain_adapter::chains::{filecoin, iotex};
use chain_adapter::config::{parse_config, AdapterConfig};
use chain_adapter::{FilecoinTx, IotexClient, IotexTx};

mod common;

fn example(address: &str) -> TxParams {
    TxParams {
        from: Address::from(address),
        to: Address::from(address),
        value: U256::from(1),
        nonce: U256::from(132),
        gas_price: U256::from(100_000_000_000u64),
        gas_limit: U256::from(1_000_000),
        payload: Bytes::new(),
    }
}

/// Build, sign and round-trip one transfer, returning the signed transaction.
fn run_lifecycle<B: TxBuilder>(builder: &B, params: TxParams) -> B::Tx {
    let key = common::TestKey::anvil();
    let tx = builder.build_tx(params.clone()).unwrap();

    let sighashes = tx.sighashes().unwrap();
    assert_eq!(sighashes.len(), 1);
    assert_eq!(tx.sighashes().unwrap(), sighashes);

    tx.sign(&key.sign(&sighashes[0]), &key.compressed_public_key())
        .unwrap();
    assert!(tx.is_signed());
    assert!(matches!(
        tx.sign(&key.sign(&sighashes[0]), &key.compressed_public_key()),
        Err(ChainError::AlreadySigned)
    ));

    let bytes = tx.serialize().unwrap();
    assert!(!bytes.is_empty());
    let hash = tx.hash().unwrap();
    assert_eq!(tx.hash().unwrap(), hash);

    let decoded = <B::Tx as Tx>::deserialize(&bytes).unwrap();
    assert_eq!(decoded.from(), &params.from);
    assert_eq!(decoded.to(), &params.to);
    assert_eq!(decoded.value(), params.value);
    assert_eq!(decoded.nonce(), params.nonce);
    assert_eq!(decoded.payload(), &params.payload);
    assert_eq!(decoded.hash().unwrap(), hash);

    tx
}

#[test]
fn test_iotex_example_scenario() {
    let config = AdapterConfig::default();
    let builder = iotex::IotexTxBuilder::new(&config.iotex);
    let tx: IotexTx = run_lifecycle(
        &builder,
        example("io17w0adeg64ky0daxwd2ugyuneellmjgnxa07fhr"),
    );
    assert_eq!(
        hex::encode(tx.sighashes().unwrap()[0]),
        "142f05355e8b389185593147ba6fca0838ba6acbd6cce8df8e31f877aaf8ce5d"
    );
    assert_eq!(tx.chain_id(), 1);
}

#[test]
fn test_filecoin_example_scenario() {
    let config = AdapterConfig::default();
    let builder = filecoin::FilecoinTxBuilder::new(&config.filecoin);
    let tx: FilecoinTx = run_lifecycle(
        &builder,
        example("f1nqjokbjze2a2nx36kz6oq54wns4w5jcwhzuzy2i"),
    );
    assert_eq!(
        tx.message_cid().unwrap().to_string(),
        "bafy2bzacebuhtsw4yr46bhoioxdligo7alnd3azztcvibpz4r4a2el5jmqnqo"
    );
}

#[test]
fn test_payload_survives_both_chains() {
    let config = AdapterConfig::default();

    let mut params = example("io17w0adeg64ky0daxwd2ugyuneellmjgnxa07fhr");
    params.payload = Bytes::from_static(b"invoice-42");
    run_lifecycle(&iotex::IotexTxBuilder::new(&config.iotex), params);

    let mut params = example("f1nqjokbjze2a2nx36kz6oq54wns4w5jcwhzuzy2i");
    params.payload = Bytes::from_static(b"invoice-42");
    run_lifecycle(&filecoin::FilecoinTxBuilder::new(&config.filecoin), params);
}

#[test]
fn test_configured_envelope_defaults() {
    let config = parse_config(
        r#"
        [iotex]
        chain_id = 2

        [filecoin]
        network = "testnet"
        default_method = 2
        gas_premium = 1
        "#,
    )
    .unwrap();

    let tx = iotex::IotexTxBuilder::new(&config.iotex)
        .build_tx(example("io17w0adeg64ky0daxwd2ugyuneellmjgnxa07fhr"))
        .unwrap();
    assert_eq!(tx.chain_id(), 2);

    let tx = filecoin::FilecoinTxBuilder::new(&config.filecoin)
        .build_tx(example("t1nqjokbjze2a2nx36kz6oq54wns4w5jcwhzuzy2i"))
        .unwrap();
    assert_eq!(tx.method(), 2);
    assert_eq!(tx.gas_premium(), U256::from(1));
}

#[tokio::test]
async fn test_gas_price_falls_back_when_node_is_down() {
    let mut config = AdapterConfig::default();
    config.iotex.endpoint = "127.0.0.1:1".to_string();
    config.iotex.secure = false;

    let estimator = PollingGasEstimator::new(
        IotexClient::from_config(&config.iotex),
        iotex::gas_policy(&config.iotex),
    );

    assert_eq!(
        estimator.estimate_gas_price().await.unwrap(),
        U256::from(config.iotex.gas_price)
    );
    assert_eq!(
        estimator.estimate_gas_limit(TxType::Transfer).unwrap(),
        U256::from(config.iotex.transfer_gas_limit)
    );
}
