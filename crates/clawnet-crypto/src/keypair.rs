use clawnet_core::types::{Did, Ed25519PublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::hash::did_from_pubkey;

/// A ClawNet identity keypair: Ed25519 public + secret key with the derived
/// DID.
///
/// The secret key is held in a `Zeroizing<[u8; 32]>` to wipe memory on drop.
#[derive(Serialize, Deserialize)]
pub struct KeyPair {
    pub did: Did,
    pub public_key: Ed25519PublicKey,
    secret_key: [u8; 32],
}

impl KeyPair {
    /// Generate a fresh Ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let pk_bytes = signing_key.verifying_key().to_bytes();
        let did = did_from_pubkey(&pk_bytes);
        Self {
            did,
            public_key: Ed25519PublicKey(pk_bytes),
            secret_key: signing_key.to_bytes(),
        }
    }

    /// Sign `message` using this keypair's secret key.
    pub fn sign(&self, message: &[u8]) -> clawnet_core::types::Ed25519Signature {
        let sk = Zeroizing::new(self.secret_key);
        crate::ed25519::sign(sk.as_ref(), message).expect("sign with valid secret key is infallible")
    }

    /// Return a read-only view of the secret key bytes.
    pub fn secret_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    /// Restore a KeyPair from raw bytes (e.g. loaded from a keystore file).
    pub fn from_raw(pk_bytes: [u8; 32], sk_bytes: [u8; 32]) -> Self {
        let did = did_from_pubkey(&pk_bytes);
        Self {
            did,
            public_key: Ed25519PublicKey(pk_bytes),
            secret_key: sk_bytes,
        }
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ did: {:?} }}", self.did)
    }
}
