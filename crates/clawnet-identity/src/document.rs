use clawnet_core::types::{Did, Ed25519PublicKey, Hash32, Timestamp, X25519PublicKey};
use serde::{Deserialize, Serialize};

// ── DID document ─────────────────────────────────────────────────────────────

/// The full on-chain representation of a ClawNet identity.
///
/// `did` is immutable for the lifetime of the document; everything else can
/// evolve through `identity.update` events, each one hash-chained to the
/// last via `prev_doc_hash`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DidDocument {
    pub did: Did,

    /// Current authentication key. Only the holder of this key may sign
    /// further events on behalf of `did`.
    pub auth_key: Ed25519PublicKey,

    /// Optional key-agreement key, published so counterparties can seal
    /// content to this identity (info-market delivery, §4.4).
    #[serde(default)]
    pub agreement_key: Option<X25519PublicKey>,

    #[serde(default)]
    pub platforms: Vec<PlatformLink>,

    #[serde(default)]
    pub capabilities: Vec<CapabilityCredential>,

    /// Hash of the canonical form of the document this one replaced, or
    /// `None` for the document created by `identity.create`.
    pub prev_doc_hash: Option<Hash32>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A verifiable credential binding an external platform username to this
/// DID, issued and signed by the platform's own DID.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformLink {
    pub platform: String,
    pub external_username: String,
    pub issuer_did: Did,
    /// Opaque proof bytes (hex), the credential's embedded signature.
    pub proof: String,
    pub linked_at: Timestamp,
}

/// A declared capability an agent offers, optionally backed by a credential
/// from some issuer (a platform, an auditor, a peer DID).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilityCredential {
    pub name: String,
    pub pricing_schema: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issuer_credential: Option<IssuerCredential>,
    pub registered_at: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuerCredential {
    pub issuer_did: Did,
    pub proof: String,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

impl DidDocument {
    /// Returns true if `pubkey` would verify signatures from this document's
    /// current auth key.
    pub fn is_current_key(&self, pubkey: &Ed25519PublicKey) -> bool {
        self.auth_key.0 == pubkey.0
    }
}
