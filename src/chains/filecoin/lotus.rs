//! Lotus JSON-RPC types.
//!
//! Lotus exchanges messages in a JSON form derived from the same fields as
//! the CBOR encoding: addresses as strings, token amounts as decimal strings
//! and byte fields as standard base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::blockchain::{AddressEncoder, ChainError, ChainResult, Tx};
use crate::chains::filecoin::address::AddressCodec;
use crate::chains::filecoin::cid::CidLink;
use crate::chains::filecoin::message::SIGNATURE_SECP256K1;
use crate::chains::filecoin::transaction::FilecoinTx;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: serde_json::Value,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusMessage {
    pub version: u64,
    pub to: String,
    pub from: String,
    pub nonce: u64,
    pub value: String,
    pub gas_limit: i64,
    pub gas_fee_cap: String,
    pub gas_premium: String,
    pub method: u64,
    /// Base64; `null` when empty.
    pub params: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSignature {
    #[serde(rename = "Type")]
    pub sig_type: u8,
    /// Base64 `r || s || v`.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSignedMessage {
    pub message: LotusMessage,
    pub signature: LotusSignature,
}

/// Result of `Filecoin.StateSearchMsg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MsgLookup {
    pub message: CidLink,
    pub height: i64,
}

/// The part of `Filecoin.ChainHead` the client reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TipSet {
    pub height: i64,
}

/// Addresses are rendered from the raw message bytes, so the JSON form
/// always describes the exact message that was signed.
impl TryFrom<&FilecoinTx> for LotusSignedMessage {
    type Error = ChainError;

    fn try_from(tx: &FilecoinTx) -> ChainResult<Self> {
        let signature = tx
            .signature()
            .ok_or_else(|| ChainError::Encoding("filecoin message is not signed".to_string()))?;
        // Surfaces an unusable public key before anything is sent.
        tx.serialize()?;

        let codec = AddressCodec::new(tx.network());
        let message = tx.message();
        let params = (!message.params.is_empty()).then(|| STANDARD.encode(&message.params));

        Ok(Self {
            message: LotusMessage {
                version: message.version,
                to: codec.encode_address(&message.to)?.to_string(),
                from: codec.encode_address(&message.from)?.to_string(),
                nonce: message.nonce,
                value: message.value.to_string(),
                gas_limit: message.gas_limit,
                gas_fee_cap: message.gas_fee_cap.to_string(),
                gas_premium: message.gas_premium.to_string(),
                method: message.method,
                params,
            },
            signature: LotusSignature {
                sig_type: SIGNATURE_SECP256K1,
                data: STANDARD.encode(signature.as_slice()),
            },
        })
    }
}
