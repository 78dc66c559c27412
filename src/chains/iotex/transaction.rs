//! IoTeX transfer actions.
//!
//! An unsigned transaction is an `ActionCore` carrying a `Transfer`. The
//! sighash is blake2b-256 over the protobuf `ActionCore`, which is the same
//! encoding the node re-derives when it verifies the signed `Action`.

use std::fmt;
use std::sync::OnceLock;

use alloy::primitives::{Bytes, B256, U256};
use prost::Message;

use crate::blockchain::transaction::u256_to_u64;
use crate::blockchain::types::normalize_recovery_id;
use crate::blockchain::{
    Address, AddressDecoder, ChainError, ChainResult, DecodingError, Signature65, Tx, TxBuilder,
    TxParams,
};
use crate::chains::crypto::{blake2b_256, uncompressed_public_key, UncompressedKey};
use crate::chains::iotex::address::AddressCodec;
use crate::chains::iotex::proto::{action_core, Action, ActionCore, Transfer};
use crate::config::IotexConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureSlot {
    signature: Signature65,
    public_key: UncompressedKey,
}

/// An IoTeX transfer, unsigned until [`Tx::sign`] succeeds once.
pub struct IotexTx {
    from: Address,
    to: Address,
    value: U256,
    nonce: U256,
    gas_price: U256,
    gas_limit: U256,
    payload: Bytes,
    core: ActionCore,
    signature: OnceLock<SignatureSlot>,
}

impl IotexTx {
    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn gas_limit(&self) -> U256 {
        self.gas_limit
    }

    pub fn chain_id(&self) -> u32 {
        self.core.chain_id
    }

    /// The signed portion of the action.
    pub fn core(&self) -> &ActionCore {
        &self.core
    }

    /// The attached signature, if any, with `v` in {0, 1}.
    pub fn signature(&self) -> Option<Signature65> {
        self.signature.get().map(|slot| slot.signature)
    }

    /// The signed protobuf envelope.
    pub(crate) fn to_action(&self) -> ChainResult<Action> {
        let slot = self.signature.get().ok_or_else(|| {
            ChainError::Encoding("iotex action is not signed".to_string())
        })?;

        Ok(Action {
            core: Some(self.core.clone()),
            sender_pub_key: slot.public_key.to_vec(),
            signature: slot.signature.to_vec(),
        })
    }

    /// Rebuild a transaction from a decoded protobuf `Action`.
    pub(crate) fn from_action(action: Action) -> ChainResult<Self> {
        let core = action
            .core
            .ok_or_else(|| malformed("action has no core"))?;
        let transfer = match &core.action {
            Some(action_core::Action::Transfer(transfer)) => transfer.clone(),
            None => return Err(malformed("action core carries no transfer").into()),
        };

        let value = parse_decimal("amount", &transfer.amount)?;
        let gas_price = parse_decimal("gasPrice", &core.gas_price)?;

        let codec = AddressCodec;
        let public_key = uncompressed_public_key(&action.sender_pub_key)
            .map_err(DecodingError::UnrecoverableSender)?;
        let from = codec
            .address_from_public_key(&public_key)
            .map_err(|e| DecodingError::UnrecoverableSender(e.to_string()))?;

        let to = Address::new(transfer.recipient.clone());
        codec
            .decode_address(&to)
            .map_err(|e| malformed(&format!("recipient: {}", e)))?;

        let signature: [u8; 65] = action.signature.as_slice().try_into().map_err(|_| {
            malformed(&format!(
                "signature must be 65 bytes, got {}",
                action.signature.len()
            ))
        })?;

        Ok(Self {
            from,
            to,
            value,
            nonce: U256::from(core.nonce),
            gas_price,
            gas_limit: U256::from(core.gas_limit),
            payload: Bytes::from(transfer.payload),
            core,
            signature: OnceLock::from(SignatureSlot {
                signature: Signature65::from(signature),
                public_key,
            }),
        })
    }
}

impl Tx for IotexTx {
    fn hash(&self) -> ChainResult<Vec<u8>> {
        Ok(blake2b_256(&self.serialize()?).to_vec())
    }

    fn from(&self) -> &Address {
        &self.from
    }

    fn to(&self) -> &Address {
        &self.to
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn nonce(&self) -> U256 {
        self.nonce
    }

    fn payload(&self) -> &Bytes {
        &self.payload
    }

    fn sighashes(&self) -> ChainResult<Vec<B256>> {
        if self.core.action.is_none() {
            return Err(ChainError::Encoding("action core carries no transfer".to_string()));
        }
        Ok(vec![blake2b_256(&self.core.encode_to_vec())])
    }

    fn sign(&self, signature: &Signature65, public_key: &[u8]) -> ChainResult<()> {
        // A rejected key must leave the slot empty.
        let public_key = uncompressed_public_key(public_key)
            .map_err(|e| ChainError::Encoding(format!("sender public key: {}", e)))?;
        self.signature
            .set(SignatureSlot {
                signature: normalize_recovery_id(signature),
                public_key,
            })
            .map_err(|_| ChainError::AlreadySigned)
    }

    fn is_signed(&self) -> bool {
        self.signature.get().is_some()
    }

    fn serialize(&self) -> ChainResult<Vec<u8>> {
        Ok(self.to_action()?.encode_to_vec())
    }

    fn deserialize(bytes: &[u8]) -> ChainResult<Self> {
        let action = Action::decode(bytes).map_err(|e| malformed(&e.to_string()))?;
        Self::from_action(action)
    }
}

impl fmt::Debug for IotexTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IotexTx")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("value", &self.value)
            .field("nonce", &self.nonce)
            .field("chain_id", &self.core.chain_id)
            .field("signed", &self.is_signed())
            .finish()
    }
}

fn malformed(reason: &str) -> DecodingError {
    DecodingError::MalformedEnvelope(reason.to_string())
}

fn parse_decimal(field: &'static str, value: &str) -> Result<U256, DecodingError> {
    let unparsable = || DecodingError::UnparsableNumeric {
        field,
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unparsable());
    }
    U256::from_str_radix(value, 10).map_err(|_| unparsable())
}

/// Builds IoTeX transfers.
///
/// Envelope defaults are part of the adapter contract:
/// * `version` is [`IotexConfig::envelope_version`] (1 unless configured)
/// * `chainID` is [`IotexConfig::chain_id`] (1 = mainnet)
/// * the action is always a `Transfer`; a non-empty payload is carried as
///   the transfer payload
#[derive(Debug, Clone)]
pub struct IotexTxBuilder {
    version: u32,
    chain_id: u32,
    codec: AddressCodec,
}

impl IotexTxBuilder {
    pub fn new(config: &IotexConfig) -> Self {
        Self {
            version: config.envelope_version,
            chain_id: config.chain_id,
            codec: AddressCodec,
        }
    }
}

impl TxBuilder for IotexTxBuilder {
    type Tx = IotexTx;

    fn build_tx(&self, params: TxParams) -> ChainResult<IotexTx> {
        for (field, address) in [("from", &params.from), ("to", &params.to)] {
            self.codec.decode_address(address).map_err(|e| {
                ChainError::Construction(format!("{} address {}: {}", field, address, e))
            })?;
        }

        let nonce = u256_to_u64(params.nonce, "nonce")?;
        let gas_limit = u256_to_u64(params.gas_limit, "gas limit")?;

        let core = ActionCore {
            version: self.version,
            nonce,
            gas_limit,
            gas_price: params.gas_price.to_string(),
            chain_id: self.chain_id,
            action: Some(action_core::Action::Transfer(Transfer {
                amount: params.value.to_string(),
                recipient: params.to.as_str().to_string(),
                payload: params.payload.to_vec(),
            })),
        };

        tracing::trace!(from = %params.from, to = %params.to, nonce, "Built iotex transfer");

        Ok(IotexTx {
            from: params.from,
            to: params.to,
            value: params.value,
            nonce: params.nonce,
            gas_price: params.gas_price,
            gas_limit: params.gas_limit,
            payload: params.payload,
            core,
            signature: OnceLock::new(),
        })
    }
}
