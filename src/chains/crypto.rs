//! Digest and secp256k1 helpers shared by the chain adapters.
//!
//! Both adapters only ever *verify-side* handle keys: public keys are parsed
//! and re-encoded, and public keys are recovered from signatures. Nothing here
//! signs.

use alloy::primitives::B256;
use blake2::digest::consts::{U20, U32, U4};
use blake2::{Blake2b, Digest};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;

use crate::blockchain::Signature65;

/// Uncompressed SEC1 public key (`0x04 || x || y`).
pub type UncompressedKey = [u8; 65];

pub fn blake2b_256(data: &[u8]) -> B256 {
    B256::from_slice(&Blake2b::<U32>::digest(data))
}

pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Blake2b::<U20>::digest(data));
    out
}

pub fn blake2b_32(data: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&Blake2b::<U4>::digest(data));
    out
}

/// Parse a compressed or uncompressed secp256k1 public key and return its
/// uncompressed encoding.
pub fn uncompressed_public_key(bytes: &[u8]) -> Result<UncompressedKey, String> {
    let key = PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| format!("invalid secp256k1 public key ({} bytes)", bytes.len()))?;
    encode_uncompressed(&key)
}

/// Recover the signer's uncompressed public key from a 65-byte signature over
/// `prehash`. The recovery byte may be 0/1 or 27/28.
pub fn recover_public_key(prehash: &B256, signature: &Signature65) -> Result<UncompressedKey, String> {
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| format!("invalid signature: {}", e))?;
    let v = if signature[64] >= 27 {
        signature[64] - 27
    } else {
        signature[64]
    };
    let recovery_id =
        RecoveryId::from_byte(v).ok_or_else(|| format!("invalid recovery id {}", signature[64]))?;

    let verifying_key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &sig, recovery_id)
        .map_err(|e| format!("public key recovery failed: {}", e))?;
    encode_uncompressed(&PublicKey::from(&verifying_key))
}

fn encode_uncompressed(key: &PublicKey) -> Result<UncompressedKey, String> {
    let point = key.to_encoded_point(false);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| "unexpected public key encoding length".to_string())
}
