use clawnet_core::types::X25519PublicKey;
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// An X25519 key-agreement keypair. Identity documents may publish the
/// public half so that counterparties can seal information-market content
/// for a specific recipient; the protocol engine never performs the
/// encryption itself (that remains the buyer/seller's concern).
pub struct AgreementKeyPair {
    pub public_key: X25519PublicKey,
    secret: Zeroizing<[u8; 32]>,
}

impl AgreementKeyPair {
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self {
            public_key: X25519PublicKey(public.to_bytes()),
            secret: Zeroizing::new(secret.to_bytes()),
        }
    }

    /// Derive a shared secret with a counterparty's public key.
    pub fn diffie_hellman(&self, their_public: &X25519PublicKey) -> [u8; 32] {
        let secret = StaticSecret::from(*self.secret);
        let their_public = PublicKey::from(their_public.0);
        secret.diffie_hellman(&their_public).to_bytes()
    }
}

impl std::fmt::Debug for AgreementKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AgreementKeyPair {{ public_key: {:?} }}", self.public_key)
    }
}
