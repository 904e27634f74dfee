use clawnet_core::types::{Address, Did, Hash32};

/// Compute BLAKE3 hash of arbitrary bytes.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Derive the DID for a raw Ed25519 public key.
pub fn did_from_pubkey(pubkey_bytes: &[u8; 32]) -> Did {
    Did::from_public_key(pubkey_bytes)
}

/// Derive the wallet address for a raw Ed25519 public key.
pub fn address_from_pubkey(pubkey_bytes: &[u8; 32]) -> Address {
    Address::from_public_key(pubkey_bytes)
}

/// Derive the envelope hash from its canonical signing bytes.
pub fn envelope_hash(canonical_bytes: &[u8]) -> Hash32 {
    Hash32::from_bytes(blake3_hash(canonical_bytes))
}
