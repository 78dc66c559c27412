//! IoTeX address codec.
//!
//! IoTeX addresses are BIP-173 bech32 strings with the `io` prefix over a
//! 20-byte payload. A key's payload is the last 20 bytes of the keccak256 of
//! its uncompressed public key, without the `0x04` tag.

use alloy::primitives::keccak256;
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

use crate::blockchain::{Address, AddressDecoder, AddressEncoder, ChainError, ChainResult, RawAddress};
use crate::chains::crypto::UncompressedKey;

/// Human-readable part of every IoTeX address.
pub const IOTEX_HRP: Hrp = Hrp::parse_unchecked("io");

/// Length of a decoded IoTeX address.
pub const ADDRESS_LENGTH: usize = 20;

/// Bech32 encoder/decoder for IoTeX addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressCodec;

impl AddressCodec {
    pub fn new() -> Self {
        Self
    }

    /// Address owned by an uncompressed secp256k1 public key.
    pub fn address_from_public_key(&self, public_key: &UncompressedKey) -> ChainResult<Address> {
        let digest = keccak256(&public_key[1..]);
        self.encode_address(&RawAddress::new(&digest[12..]))
    }
}

impl AddressDecoder for AddressCodec {
    fn decode_address(&self, address: &Address) -> ChainResult<RawAddress> {
        let s = address.as_str();
        // Only the canonical lower-case form re-encodes to the same string.
        if s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ChainError::Format(format!(
                "iotex address must be lower case: {}",
                s
            )));
        }

        let checked = CheckedHrpstring::new::<Bech32>(s)
            .map_err(|e| ChainError::Format(format!("invalid iotex address {}: {}", s, e)))?;
        if checked.hrp() != IOTEX_HRP {
            return Err(ChainError::Format(format!(
                "invalid iotex address prefix '{}'",
                checked.hrp()
            )));
        }

        let bytes: Vec<u8> = checked.byte_iter().collect();
        if bytes.len() != ADDRESS_LENGTH {
            return Err(ChainError::Format(format!(
                "iotex address payload must be {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            )));
        }
        Ok(RawAddress::new(bytes))
    }
}

impl AddressEncoder for AddressCodec {
    fn encode_address(&self, raw: &RawAddress) -> ChainResult<Address> {
        if raw.as_bytes().len() != ADDRESS_LENGTH {
            return Err(ChainError::Format(format!(
                "iotex address payload must be {} bytes, got {}",
                ADDRESS_LENGTH,
                raw.as_bytes().len()
            )));
        }
        bech32::encode::<Bech32>(IOTEX_HRP, raw.as_bytes())
            .map(Address::new)
            .map_err(|e| ChainError::Format(format!("bech32 encoding failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::testutil::{TestKey, ANVIL_ETH_ADDRESS};

    const KNOWN: &str = "io17ch0jth3dxqa7w9vu05yu86mqh0n6502d92lmp";

    #[test]
    fn test_decode_known_address() {
        let raw = AddressCodec.decode_address(&Address::from(KNOWN)).unwrap();
        assert_eq!(
            hex::encode(raw.as_bytes()),
            "f62ef92ef16981df38ace3e84e1f5b05df3d51ea"
        );
    }

    #[test]
    fn test_address_round_trip() {
        let codec = AddressCodec::new();
        let raw = codec.decode_address(&Address::from(KNOWN)).unwrap();
        assert_eq!(codec.encode_address(&raw).unwrap().as_str(), KNOWN);
    }

    #[test]
    fn test_address_from_public_key() {
        let key = TestKey::anvil();
        let address = AddressCodec
            .address_from_public_key(&key.uncompressed_public_key())
            .unwrap();
        assert_eq!(address.as_str(), "io17w0adeg64ky0daxwd2ugyuneellmjgnxa07fhr");

        let raw = AddressCodec.decode_address(&address).unwrap();
        assert_eq!(hex::encode(raw.as_bytes()), ANVIL_ETH_ADDRESS);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let corrupted = KNOWN.replace("lmp", "lmq");
        let err = AddressCodec.decode_address(&Address::from(corrupted)).unwrap_err();
        assert!(matches!(err, ChainError::Format(_)));
    }

    #[test]
    fn test_rejects_wrong_prefix_and_case() {
        // Valid bech32, wrong human-readable part.
        let raw = RawAddress::new([7u8; 20]);
        let foreign = bech32::encode::<Bech32>(Hrp::parse_unchecked("bc"), raw.as_bytes()).unwrap();
        assert!(AddressCodec.decode_address(&Address::from(foreign)).is_err());

        let upper = KNOWN.to_ascii_uppercase();
        assert!(AddressCodec.decode_address(&Address::from(upper)).is_err());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let short = bech32::encode::<Bech32>(IOTEX_HRP, &[1u8; 19]).unwrap();
        assert!(AddressCodec.decode_address(&Address::from(short)).is_err());
        assert!(AddressCodec.encode_address(&RawAddress::new([1u8; 21])).is_err());
    }
}
