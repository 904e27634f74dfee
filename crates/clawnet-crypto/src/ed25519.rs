use clawnet_core::types::Ed25519Signature;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid secret key length: expected 32 bytes, got {got}")]
    InvalidSecretKeyLength { got: usize },
}

/// Sign `message` with a raw 32-byte Ed25519 secret key.
pub fn sign(secret_key_bytes: &[u8], message: &[u8]) -> Result<Ed25519Signature, SignatureError> {
    if secret_key_bytes.len() != 32 {
        return Err(SignatureError::InvalidSecretKeyLength {
            got: secret_key_bytes.len(),
        });
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(secret_key_bytes);
    let signing_key = SigningKey::from_bytes(&seed);
    let sig = signing_key.sign(message);
    Ok(Ed25519Signature(sig.to_bytes()))
}

/// Verify an Ed25519 signature.
pub fn verify_signature(
    public_key: &clawnet_core::types::Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(&public_key.0).map_err(|_| SignatureError::InvalidPublicKey)?;
    let sig = Signature::from_bytes(&signature.0);
    verifying_key
        .verify(message, &sig)
        .map_err(|_| SignatureError::InvalidSignature)
}

/// Stateless signer helper used by envelope builders.
pub struct ClawNetSigner {
    pub public_key: clawnet_core::types::Ed25519PublicKey,
    signing_key: SigningKey,
}

impl ClawNetSigner {
    pub fn from_secret_key_bytes(sk_bytes: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&sk_bytes);
        let public_key =
            clawnet_core::types::Ed25519PublicKey(signing_key.verifying_key().to_bytes());
        Self {
            public_key,
            signing_key,
        }
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    pub fn verify(&self, message: &[u8], sig: &Ed25519Signature) -> Result<(), SignatureError> {
        verify_signature(&self.public_key, message, sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn fresh_signing_key() -> SigningKey {
        SigningKey::generate(&mut OsRng)
    }

    #[test]
    fn sign_verify_round_trip() {
        let signing_key = fresh_signing_key();
        let pk = clawnet_core::types::Ed25519PublicKey(signing_key.verifying_key().to_bytes());
        let message = b"autonomous agents, self-sovereign identity";

        let signer = ClawNetSigner::from_secret_key_bytes(signing_key.to_bytes());
        let sig = signer.sign(message);
        assert!(verify_signature(&pk, message, &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails() {
        let signing_key = fresh_signing_key();
        let pk = clawnet_core::types::Ed25519PublicKey(signing_key.verifying_key().to_bytes());
        let signer = ClawNetSigner::from_secret_key_bytes(signing_key.to_bytes());
        let sig = signer.sign(b"original");
        assert!(verify_signature(&pk, b"tampered", &sig).is_err());
    }

    #[test]
    fn tampered_signature_fails() {
        let signing_key = fresh_signing_key();
        let pk = clawnet_core::types::Ed25519PublicKey(signing_key.verifying_key().to_bytes());
        let signer = ClawNetSigner::from_secret_key_bytes(signing_key.to_bytes());
        let mut sig = signer.sign(b"message");
        sig.0[0] ^= 0xff;
        assert!(verify_signature(&pk, b"message", &sig).is_err());
    }
}
