//! Content identifiers for DAG-CBOR objects.
//!
//! Only the form Filecoin uses for messages is supported: CIDv1, codec
//! dag-cbor (0x71), multihash blake2b-256 (0xb220, 32-byte digest).

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};

use crate::blockchain::{ChainError, ChainResult};
use crate::chains::crypto::blake2b_256;

/// `version 1 || dag-cbor || blake2b-256 || digest length 32`, all varints.
const PREFIX: [u8; 6] = [0x01, 0x71, 0xa0, 0xe4, 0x02, 0x20];

/// Multibase prefix for lower-case base32.
const MULTIBASE_BASE32: char = 'b';

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cid([u8; 38]);

impl Cid {
    /// CID of DAG-CBOR encoded bytes.
    pub fn of_dag_cbor(data: &[u8]) -> Self {
        let mut bytes = [0u8; 38];
        bytes[..6].copy_from_slice(&PREFIX);
        bytes[6..].copy_from_slice(blake2b_256(data).as_slice());
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> ChainResult<Self> {
        let bytes: [u8; 38] = bytes.try_into().map_err(|_| {
            ChainError::Format(format!("cid must be 38 bytes, got {}", bytes.len()))
        })?;
        if bytes[..6] != PREFIX {
            return Err(ChainError::Format(
                "unsupported cid: expected v1 dag-cbor blake2b-256".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn digest(&self) -> &[u8] {
        &self.0[6..]
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            MULTIBASE_BASE32,
            BASE32_NOPAD.encode(&self.0).to_ascii_lowercase()
        )
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self)
    }
}

impl FromStr for Cid {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        let body = s
            .strip_prefix(MULTIBASE_BASE32)
            .ok_or_else(|| ChainError::Format(format!("cid {} is not base32 multibase", s)))?;
        if body.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(ChainError::Format(format!("cid {} must be lower case", s)));
        }
        let bytes = BASE32_NOPAD
            .decode(body.to_ascii_uppercase().as_bytes())
            .map_err(|e| ChainError::Format(format!("cid {}: {}", s, e)))?;
        Self::from_bytes(&bytes)
    }
}

/// The `{"/": "<cid>"}` JSON form Lotus uses for links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidLink {
    #[serde(rename = "/")]
    pub root: String,
}

impl From<&Cid> for CidLink {
    fn from(cid: &Cid) -> Self {
        Self {
            root: cid.to_string(),
        }
    }
}

impl TryFrom<&CidLink> for Cid {
    type Error = ChainError;

    fn try_from(link: &CidLink) -> ChainResult<Self> {
        link.root.parse()
    }
}
