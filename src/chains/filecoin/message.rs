//! Filecoin message encoding.
//!
//! Messages are DAG-CBOR arrays:
//! ```text
//! Message       = [version, to, from, nonce, value, gasLimit, gasFeeCap, gasPremium, method, params]
//! SignedMessage = [Message, signature]
//! ```
//! Token amounts are big integers: empty bytes for zero, otherwise a sign
//! byte (0x00) followed by the big-endian magnitude. A secp256k1 signature is
//! `0x01 || r || s || v`.

use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use crate::blockchain::{DecodingError, RawAddress, Signature65};

/// Signature type byte for secp256k1.
pub const SIGNATURE_SECP256K1: u8 = 1;

/// Signature type byte for BLS.
pub const SIGNATURE_BLS: u8 = 2;

const CBOR_ARRAY_10: u8 = 0x8a;
const CBOR_ARRAY_2: u8 = 0x82;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: u64,
    pub to: RawAddress,
    pub from: RawAddress,
    pub nonce: u64,
    pub value: U256,
    pub gas_limit: i64,
    pub gas_fee_cap: U256,
    pub gas_premium: U256,
    pub method: u64,
    pub params: Bytes,
}

#[derive(Serialize, Deserialize)]
struct MessageTuple(
    u64,
    ByteBuf,
    ByteBuf,
    u64,
    ByteBuf,
    i64,
    ByteBuf,
    ByteBuf,
    u64,
    ByteBuf,
);

#[derive(Serialize, Deserialize)]
struct SignedMessageTuple(MessageTuple, ByteBuf);

/// Which envelope a byte string holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Unsigned,
    Signed,
}

impl Envelope {
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes.first() {
            Some(&CBOR_ARRAY_10) => Some(Envelope::Unsigned),
            Some(&CBOR_ARRAY_2) => Some(Envelope::Signed),
            _ => None,
        }
    }
}

pub fn encode_big_int(value: U256) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let mut out = Vec::with_capacity(33 - start);
    out.push(0x00);
    out.extend_from_slice(&bytes[start..]);
    out
}

/// Decode a non-negative, minimally encoded big integer.
pub fn decode_big_int(field: &'static str, bytes: &[u8]) -> Result<U256, DecodingError> {
    let unparsable = || DecodingError::UnparsableNumeric {
        field,
        value: hex::encode(bytes),
    };
    let Some((&sign, magnitude)) = bytes.split_first() else {
        return Ok(U256::ZERO);
    };
    if sign != 0x00 || magnitude.is_empty() || magnitude[0] == 0 {
        return Err(unparsable());
    }
    U256::try_from_be_slice(magnitude).ok_or_else(unparsable)
}

impl Message {
    fn to_tuple(&self) -> MessageTuple {
        MessageTuple(
            self.version,
            ByteBuf::from(self.to.as_bytes().to_vec()),
            ByteBuf::from(self.from.as_bytes().to_vec()),
            self.nonce,
            ByteBuf::from(encode_big_int(self.value)),
            self.gas_limit,
            ByteBuf::from(encode_big_int(self.gas_fee_cap)),
            ByteBuf::from(encode_big_int(self.gas_premium)),
            self.method,
            ByteBuf::from(self.params.to_vec()),
        )
    }

    fn from_tuple(tuple: MessageTuple) -> Result<Self, DecodingError> {
        let MessageTuple(version, to, from, nonce, value, gas_limit, fee_cap, premium, method, params) =
            tuple;
        Ok(Self {
            version,
            to: RawAddress::new(to.into_vec()),
            from: RawAddress::new(from.into_vec()),
            nonce,
            value: decode_big_int("value", &value)?,
            gas_limit,
            gas_fee_cap: decode_big_int("gasFeeCap", &fee_cap)?,
            gas_premium: decode_big_int("gasPremium", &premium)?,
            method,
            params: Bytes::from(params.into_vec()),
        })
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, String> {
        to_cbor(&self.to_tuple())
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, DecodingError> {
        Self::from_tuple(from_cbor(bytes)?)
    }

    /// `SignedMessage` CBOR with a secp256k1 signature.
    pub fn to_signed_cbor(&self, signature: &Signature65) -> Result<Vec<u8>, String> {
        to_cbor(&SignedMessageTuple(
            self.to_tuple(),
            ByteBuf::from(secp256k1_signature_bytes(signature)),
        ))
    }

    /// Decode `SignedMessage` CBOR, returning the message and its 65-byte
    /// secp256k1 signature.
    pub fn from_signed_cbor(bytes: &[u8]) -> Result<(Self, Signature65), DecodingError> {
        let SignedMessageTuple(message, signature) = from_cbor(bytes)?;
        let signature = match signature.split_first() {
            Some((&SIGNATURE_SECP256K1, data)) if data.len() == 65 => Signature65::from_slice(data),
            Some((&SIGNATURE_BLS, _)) => {
                return Err(DecodingError::UnrecoverableSender(
                    "bls signatures are not supported".to_string(),
                ))
            }
            _ => {
                return Err(DecodingError::MalformedEnvelope(format!(
                    "invalid signature of {} bytes",
                    signature.len()
                )))
            }
        };
        Ok((Self::from_tuple(message)?, signature))
    }
}

pub fn secp256k1_signature_bytes(signature: &Signature65) -> Vec<u8> {
    let mut out = Vec::with_capacity(66);
    out.push(SIGNATURE_SECP256K1);
    out.extend_from_slice(signature.as_slice());
    out
}

fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

fn from_cbor<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodingError> {
    let mut reader = bytes;
    let value = ciborium::from_reader(&mut reader)
        .map_err(|e| DecodingError::MalformedEnvelope(e.to_string()))?;
    if !reader.is_empty() {
        return Err(DecodingError::MalformedEnvelope(format!(
            "{} trailing bytes",
            reader.len()
        )));
    }
    Ok(value)
}
