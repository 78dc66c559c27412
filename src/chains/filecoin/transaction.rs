//! Filecoin messages as [`Tx`] values.
//!
//! The sighash is blake2b-256 over the CID bytes of the unsigned message, as
//! Lotus verifies secp256k1 signatures. The transaction hash is the CID of
//! whatever [`Tx::serialize`] currently produces: the message CID while
//! unsigned, the signed-message CID once signed.

use std::fmt;
use std::sync::OnceLock;

use alloy::primitives::{Bytes, B256, U256};

use crate::blockchain::transaction::u256_to_u64;
use crate::blockchain::types::normalize_recovery_id;
use crate::blockchain::{
    Address, AddressDecoder, AddressEncoder, ChainError, ChainResult, DecodingError, RawAddress,
    Signature65, Tx, TxBuilder, TxParams,
};
use crate::chains::crypto::{
    blake2b_256, recover_public_key, uncompressed_public_key, UncompressedKey,
};
use crate::chains::filecoin::address::{protocol_of, AddressCodec, Protocol};
use crate::chains::filecoin::cid::Cid;
use crate::chains::filecoin::message::{Envelope, Message};
use crate::config::{FilecoinConfig, FilecoinNetwork};

/// Message version written by the builder.
pub const MESSAGE_VERSION: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureSlot {
    signature: Signature65,
    public_key: UncompressedKey,
}

/// A Filecoin message, unsigned until [`Tx::sign`] succeeds once.
pub struct FilecoinTx {
    network: FilecoinNetwork,
    from: Address,
    to: Address,
    message: Message,
    signature: OnceLock<SignatureSlot>,
}

impl FilecoinTx {
    /// Network the addresses are rendered for.
    pub fn network(&self) -> FilecoinNetwork {
        self.network
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn gas_fee_cap(&self) -> U256 {
        self.message.gas_fee_cap
    }

    pub fn gas_premium(&self) -> U256 {
        self.message.gas_premium
    }

    pub fn gas_limit(&self) -> i64 {
        self.message.gas_limit
    }

    pub fn method(&self) -> u64 {
        self.message.method
    }

    pub fn signature(&self) -> Option<Signature65> {
        self.signature.get().map(|slot| slot.signature)
    }

    /// Uncompressed key of the signer, once signed.
    pub fn public_key(&self) -> Option<UncompressedKey> {
        self.signature.get().map(|slot| slot.public_key)
    }

    /// CID of the unsigned message.
    pub fn message_cid(&self) -> ChainResult<Cid> {
        message_cid(&self.message)
    }

    /// CID of the current serialized form, the key Lotus indexes by.
    pub fn cid(&self) -> ChainResult<Cid> {
        Ok(Cid::of_dag_cbor(&self.serialize()?))
    }

    /// Decode wire bytes, rendering addresses for `network`.
    ///
    /// A signed message's public key is recovered from its signature. When
    /// the sender is a secp256k1 address it must belong to that key.
    pub fn deserialize_for(network: FilecoinNetwork, bytes: &[u8]) -> ChainResult<Self> {
        let codec = AddressCodec::new(network);
        let (message, signature) = match Envelope::detect(bytes) {
            Some(Envelope::Unsigned) => (Message::from_cbor(bytes)?, None),
            Some(Envelope::Signed) => {
                let (message, signature) = Message::from_signed_cbor(bytes)?;
                (message, Some(signature))
            }
            None => {
                return Err(DecodingError::MalformedEnvelope(
                    "not a filecoin message".to_string(),
                )
                .into())
            }
        };

        let render = |raw: &RawAddress, field: &str| {
            codec.encode_address(raw).map_err(|e| {
                DecodingError::MalformedEnvelope(format!("{} address: {}", field, e))
            })
        };
        let from = render(&message.from, "from")?;
        let to = render(&message.to, "to")?;

        let signature = match signature {
            None => OnceLock::new(),
            Some(signature) => {
                let sighash = sighash(&message)?;
                let public_key = recover_public_key(&sighash, &signature)
                    .map_err(DecodingError::UnrecoverableSender)?;
                if protocol_of(&message.from) == Some(Protocol::Secp256k1)
                    && AddressCodec::raw_from_public_key(&public_key) != message.from
                {
                    return Err(DecodingError::UnrecoverableSender(format!(
                        "signature does not belong to {}",
                        from
                    ))
                    .into());
                }
                OnceLock::from(SignatureSlot {
                    signature,
                    public_key,
                })
            }
        };

        Ok(Self {
            network,
            from,
            to,
            message,
            signature,
        })
    }
}

fn message_cid(message: &Message) -> ChainResult<Cid> {
    let bytes = message
        .to_cbor()
        .map_err(|e| ChainError::Encoding(format!("message cbor: {}", e)))?;
    Ok(Cid::of_dag_cbor(&bytes))
}

fn sighash(message: &Message) -> ChainResult<B256> {
    Ok(blake2b_256(message_cid(message)?.as_bytes()))
}

impl Tx for FilecoinTx {
    fn hash(&self) -> ChainResult<Vec<u8>> {
        Ok(self.cid()?.as_bytes().to_vec())
    }

    fn from(&self) -> &Address {
        &self.from
    }

    fn to(&self) -> &Address {
        &self.to
    }

    fn value(&self) -> U256 {
        self.message.value
    }

    fn nonce(&self) -> U256 {
        U256::from(self.message.nonce)
    }

    fn payload(&self) -> &Bytes {
        &self.message.params
    }

    fn sighashes(&self) -> ChainResult<Vec<B256>> {
        Ok(vec![sighash(&self.message)?])
    }

    fn sign(&self, signature: &Signature65, public_key: &[u8]) -> ChainResult<()> {
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
        let encoded = match self.signature.get() {
            None => self.message.to_cbor(),
            Some(slot) => self.message.to_signed_cbor(&slot.signature),
        };
        encoded.map_err(|e| ChainError::Encoding(format!("message cbor: {}", e)))
    }

    /// Decodes with mainnet (`f`) addresses. Use
    /// [`FilecoinTx::deserialize_for`] for other networks.
    fn deserialize(bytes: &[u8]) -> ChainResult<Self> {
        Self::deserialize_for(FilecoinNetwork::Mainnet, bytes)
    }
}

impl fmt::Debug for FilecoinTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilecoinTx")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("value", &self.message.value)
            .field("nonce", &self.message.nonce)
            .field("method", &self.message.method)
            .field("signed", &self.is_signed())
            .finish()
    }
}

/// Builds Filecoin messages.
///
/// Envelope defaults are part of the adapter contract:
/// * `version` is 0
/// * `method` is [`FilecoinConfig::default_method`] (0 = plain send)
/// * the caller's gas price becomes `GasFeeCap`
/// * `GasPremium` is [`FilecoinConfig::gas_premium`]
/// * the payload becomes `Params`
#[derive(Debug, Clone)]
pub struct FilecoinTxBuilder {
    codec: AddressCodec,
    method: u64,
    gas_premium: U256,
}

impl FilecoinTxBuilder {
    pub fn new(config: &FilecoinConfig) -> Self {
        Self {
            codec: AddressCodec::new(config.network),
            method: config.default_method,
            gas_premium: U256::from(config.gas_premium),
        }
    }
}

impl TxBuilder for FilecoinTxBuilder {
    type Tx = FilecoinTx;

    fn build_tx(&self, params: TxParams) -> ChainResult<FilecoinTx> {
        let decode = |field: &str, address: &Address| {
            self.codec.decode_address(address).map_err(|e| {
                ChainError::Construction(format!("{} address {}: {}", field, address, e))
            })
        };
        let from = decode("from", &params.from)?;
        let to = decode("to", &params.to)?;

        let nonce = u256_to_u64(params.nonce, "nonce")?;
        let gas_limit = i64::try_from(params.gas_limit).map_err(|_| {
            ChainError::Construction(format!("gas limit {} exceeds i64 range", params.gas_limit))
        })?;

        let message = Message {
            version: MESSAGE_VERSION,
            to,
            from,
            nonce,
            value: params.value,
            gas_limit,
            gas_fee_cap: params.gas_price,
            gas_premium: self.gas_premium,
            method: self.method,
            params: params.payload,
        };

        Ok(FilecoinTx {
            network: self.codec.network(),
            from: params.from,
            to: params.to,
            message,
            signature: OnceLock::new(),
        })
    }
}
