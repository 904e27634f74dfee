use serde::{Deserialize, Serialize};
use std::fmt;

/// Token amount in the smallest unit (one token = 1, no sub-units).
/// `u128` comfortably covers any realistic total supply.
pub type Balance = u128;

/// Unix timestamp in milliseconds, as asserted by the issuer. Advisory only —
/// never used as a causal primitive (see `Nonce` and `resourcePrev`).
pub type Timestamp = i64;

/// Strictly monotonic per-`(issuer, type-family)` sequence number.
pub type Nonce = u64;

// ── Did ──────────────────────────────────────────────────────────────────────

/// A ClawNet decentralized identifier: `did:claw:z<base58btc(multicodec ‖ key)>`.
///
/// The DID string is stored verbatim rather than decomposed, since it is
/// itself the canonical representation used inside signed envelopes; use
/// `Did::from_public_key` to derive one and `Did::verify_binding` to check
/// that a DID was in fact derived from a given key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Did(pub String);

/// Multicodec prefix for an Ed25519 public key (0xed, varint-encoded as a
/// single byte since it is below 0x80).
const MULTICODEC_ED25519_PUB: u8 = 0xed;

impl Did {
    /// Derive the canonical DID string for an Ed25519 public key.
    pub fn from_public_key(pubkey: &[u8; 32]) -> Self {
        let mut tagged = Vec::with_capacity(33);
        tagged.push(MULTICODEC_ED25519_PUB);
        tagged.extend_from_slice(pubkey);
        Self(format!("did:claw:z{}", bs58::encode(&tagged).into_string()))
    }

    /// Returns true if `self` is the DID that `from_public_key(pubkey)` would
    /// produce — i.e. the DID is cryptographically bound to this key.
    pub fn is_bound_to(&self, pubkey: &[u8; 32]) -> bool {
        *self == Did::from_public_key(pubkey)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did({})", self.0)
    }
}

// ── Address ──────────────────────────────────────────────────────────────────

/// A ClawNet wallet address: `claw` ‖ base58btc(version ‖ pubkey ‖ checksum).
/// Bijective with `Did` — every DID has exactly one address and vice versa.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub String);

const ADDRESS_VERSION: u8 = 0x00;

impl Address {
    /// Derive the address for an Ed25519 public key.
    pub fn from_public_key(pubkey: &[u8; 32]) -> Self {
        let mut payload = Vec::with_capacity(1 + 32);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(pubkey);

        let checksum_full = blake3::hash(&payload);
        let checksum = &checksum_full.as_bytes()[..4];

        let mut full = payload;
        full.extend_from_slice(checksum);

        Self(format!("claw{}", bs58::encode(&full).into_string()))
    }

    /// Derive the address that corresponds to a DID, without needing the raw
    /// public key — DIDs and addresses both commit to the same key bytes.
    pub fn from_did(did: &Did) -> Result<Self, AddressDecodeError> {
        let pubkey = decode_ed25519_pub_from_did(did)?;
        Ok(Self::from_public_key(&pubkey))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decode the raw Ed25519 public key bytes embedded in a `did:claw:z...` DID.
/// Exposed so the envelope-validation pipeline can verify the self-signed
/// `identity.create` event that brings a DID's document into existence in
/// the first place, before any stored authentication key exists to check
/// against.
pub fn ed25519_pub_from_did(did: &Did) -> Result<[u8; 32], AddressDecodeError> {
    decode_ed25519_pub_from_did(did)
}

fn decode_ed25519_pub_from_did(did: &Did) -> Result<[u8; 32], AddressDecodeError> {
    let body = did
        .0
        .strip_prefix("did:claw:z")
        .ok_or(AddressDecodeError::NotAClawDid)?;
    let tagged = bs58::decode(body)
        .into_vec()
        .map_err(|_| AddressDecodeError::BadEncoding)?;
    if tagged.len() != 33 || tagged[0] != MULTICODEC_ED25519_PUB {
        return Err(AddressDecodeError::BadEncoding);
    }
    let mut pubkey = [0u8; 32];
    pubkey.copy_from_slice(&tagged[1..]);
    Ok(pubkey)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressDecodeError {
    #[error("DID is not a did:claw DID")]
    NotAClawDid,
    #[error("malformed DID encoding")]
    BadEncoding,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

// ── Hash32 ───────────────────────────────────────────────────────────────────

/// A 32-byte BLAKE3 digest — used for envelope hashes, `resourcePrev`
/// pointers, and content hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes[..32]);
        Ok(Self(arr))
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({}…)", &self.to_hex()[..16])
    }
}

// ── Ed25519PublicKey / Ed25519Signature ──────────────────────────────────────

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({}…)", &hex::encode(self.0)[..8])
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519Signature(pub [u8; 64]);

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({}…)", &hex::encode(self.0)[..8])
    }
}

// ── X25519PublicKey ──────────────────────────────────────────────────────────

/// X25519 key-agreement public key (32 bytes), optionally attached to a DID
/// document for sealed content delivery in the info market.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct X25519PublicKey(pub [u8; 32]);

impl fmt::Debug for X25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X25519PublicKey({}…)", &hex::encode(self.0)[..8])
    }
}
