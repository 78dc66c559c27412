//! Signing helpers for tests. The adapters themselves never hold keys.

use alloy::primitives::B256;
use k256::ecdsa::SigningKey;

use crate::blockchain::Signature65;

/// Well-known development key (Anvil's first account).
pub const ANVIL_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Ethereum address of [`ANVIL_PRIVATE_KEY`], which is also its IoTeX payload.
pub const ANVIL_ETH_ADDRESS: &str = "f39fd6e51aad88f6f4ce6ab8827279cfffb92266";

pub struct TestKey(SigningKey);

impl TestKey {
    pub fn anvil() -> Self {
        let secret = hex::decode(ANVIL_PRIVATE_KEY).unwrap();
        Self(SigningKey::from_slice(&secret).unwrap())
    }

    pub fn uncompressed_public_key(&self) -> [u8; 65] {
        self.0
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .unwrap()
    }

    pub fn compressed_public_key(&self) -> Vec<u8> {
        self.0.verifying_key().to_encoded_point(true).as_bytes().to_vec()
    }

    /// Sign a prehashed digest, returning `r || s || v` with `v` in {0, 1}.
    pub fn sign(&self, digest: &B256) -> Signature65 {
        let (signature, recovery_id) = self.0.sign_prehash_recoverable(digest.as_slice()).unwrap();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Signature65::from(out)
    }
}
