//! Filecoin address codec.
//!
//! String form is `<network><protocol><payload>`:
//! * protocol 0 (ID): decimal actor id, raw payload is its unsigned LEB128
//! * protocols 1, 2, 3: lower-case unpadded base32 of `payload || checksum`,
//!   checksum = blake2b-32(`protocol || payload`)
//!
//! Raw bytes are `protocol || payload`.

use data_encoding::BASE32_NOPAD;

use crate::blockchain::{Address, AddressDecoder, AddressEncoder, ChainError, ChainResult, RawAddress};
use crate::chains::crypto::{blake2b_160, blake2b_32, UncompressedKey};
use crate::config::FilecoinNetwork;

const CHECKSUM_LENGTH: usize = 4;

/// Longest decimal rendering of a `u64` actor id.
const MAX_ID_DIGITS: usize = 20;

/// Address protocol, the first byte of a raw address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Id,
    Secp256k1,
    Actor,
    Bls,
}

impl Protocol {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Protocol::Id),
            1 => Some(Protocol::Secp256k1),
            2 => Some(Protocol::Actor),
            3 => Some(Protocol::Bls),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Protocol::Id => 0,
            Protocol::Secp256k1 => 1,
            Protocol::Actor => 2,
            Protocol::Bls => 3,
        }
    }

    /// Fixed payload length; `None` for variable-length ID payloads.
    fn payload_length(&self) -> Option<usize> {
        match self {
            Protocol::Id => None,
            Protocol::Secp256k1 | Protocol::Actor => Some(20),
            Protocol::Bls => Some(48),
        }
    }
}

/// Protocol of a decoded address.
pub fn protocol_of(raw: &RawAddress) -> Option<Protocol> {
    raw.as_bytes().first().copied().and_then(Protocol::from_byte)
}

/// Encoder/decoder for one Filecoin network.
#[derive(Debug, Clone, Copy)]
pub struct AddressCodec {
    network: FilecoinNetwork,
}

impl AddressCodec {
    pub fn new(network: FilecoinNetwork) -> Self {
        Self { network }
    }

    pub fn network(&self) -> FilecoinNetwork {
        self.network
    }

    /// Raw secp256k1 address of an uncompressed public key.
    pub fn raw_from_public_key(public_key: &UncompressedKey) -> RawAddress {
        let mut raw = Vec::with_capacity(21);
        raw.push(Protocol::Secp256k1.as_byte());
        raw.extend_from_slice(&blake2b_160(public_key));
        RawAddress::new(raw)
    }

    /// `f1`/`t1` address owned by an uncompressed public key.
    pub fn address_from_public_key(&self, public_key: &UncompressedKey) -> ChainResult<Address> {
        self.encode_address(&Self::raw_from_public_key(public_key))
    }
}

impl Default for AddressCodec {
    fn default() -> Self {
        Self::new(FilecoinNetwork::Mainnet)
    }
}

fn format_error(address: &str, reason: impl std::fmt::Display) -> ChainError {
    ChainError::Format(format!("invalid filecoin address {}: {}", address, reason))
}

fn checksum(protocol: Protocol, payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let mut input = Vec::with_capacity(payload.len() + 1);
    input.push(protocol.as_byte());
    input.extend_from_slice(payload);
    blake2b_32(&input)
}

impl AddressDecoder for AddressCodec {
    fn decode_address(&self, address: &Address) -> ChainResult<RawAddress> {
        let s = address.as_str();
        let mut chars = s.chars();

        match chars.next() {
            Some(c) if c == self.network.prefix() => {}
            _ => {
                return Err(format_error(
                    s,
                    format!("expected network prefix '{}'", self.network.prefix()),
                ))
            }
        }
        let protocol = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| Protocol::from_byte(d as u8))
            .ok_or_else(|| format_error(s, "unknown protocol"))?;
        let body = chars.as_str();

        let mut raw = vec![protocol.as_byte()];
        match protocol.payload_length() {
            None => {
                let canonical = !body.is_empty()
                    && body.len() <= MAX_ID_DIGITS
                    && body.bytes().all(|b| b.is_ascii_digit())
                    && (body == "0" || !body.starts_with('0'));
                if !canonical {
                    return Err(format_error(s, "actor id must be a canonical decimal"));
                }
                let id: u64 = body
                    .parse()
                    .map_err(|_| format_error(s, "actor id overflows u64"))?;
                raw.extend_from_slice(unsigned_varint::encode::u64(
                    id,
                    &mut unsigned_varint::encode::u64_buffer(),
                ));
            }
            Some(length) => {
                if body.bytes().any(|b| b.is_ascii_uppercase()) {
                    return Err(format_error(s, "payload must be lower case"));
                }
                let decoded = BASE32_NOPAD
                    .decode(body.to_ascii_uppercase().as_bytes())
                    .map_err(|e| format_error(s, e))?;
                if decoded.len() != length + CHECKSUM_LENGTH {
                    return Err(format_error(
                        s,
                        format!("expected {} payload bytes, got {}", length, decoded.len().saturating_sub(CHECKSUM_LENGTH)),
                    ));
                }
                let (payload, sum) = decoded.split_at(length);
                if checksum(protocol, payload) != sum {
                    return Err(format_error(s, "checksum mismatch"));
                }
                raw.extend_from_slice(payload);
            }
        }
        Ok(RawAddress::new(raw))
    }
}

impl AddressEncoder for AddressCodec {
    fn encode_address(&self, raw: &RawAddress) -> ChainResult<Address> {
        let protocol = protocol_of(raw)
            .ok_or_else(|| ChainError::Format("raw address has unknown protocol".to_string()))?;
        let payload = &raw.as_bytes()[1..];

        let body = match protocol.payload_length() {
            None => {
                let (id, rest) = unsigned_varint::decode::u64(payload).map_err(|e| {
                    ChainError::Format(format!("invalid actor id varint: {}", e))
                })?;
                if !rest.is_empty() {
                    return Err(ChainError::Format(
                        "trailing bytes after actor id".to_string(),
                    ));
                }
                id.to_string()
            }
            Some(length) => {
                if payload.len() != length {
                    return Err(ChainError::Format(format!(
                        "protocol {} payload must be {} bytes, got {}",
                        protocol.as_byte(),
                        length,
                        payload.len()
                    )));
                }
                let mut data = payload.to_vec();
                data.extend_from_slice(&checksum(protocol, payload));
                BASE32_NOPAD.encode(&data).to_ascii_lowercase()
            }
        };

        Ok(Address::new(format!(
            "{}{}{}",
            self.network.prefix(),
            protocol.as_byte(),
            body
        )))
    }
}
