use clawnet_core::types::{Did, Ed25519PublicKey};

use crate::document::{CapabilityCredential, DidDocument, PlatformLink};
use crate::store::IdentityStore;

/// Read-side view over identity state, computed on demand from whatever the
/// store holds rather than maintained as a separately-invalidated cache.
pub struct IdentityQuery<'a, S: IdentityStore> {
    store: &'a S,
}

impl<'a, S: IdentityStore> IdentityQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn document(&self, did: &Did) -> Option<DidDocument> {
        self.store.get_document(did)
    }

    /// The auth key currently authorized to sign on behalf of `did`. Used by
    /// the envelope validation pipeline's signature step.
    pub fn current_auth_key(&self, did: &Did) -> Option<Ed25519PublicKey> {
        self.store.get_document(did).map(|d| d.auth_key)
    }

    /// Whether `pubkey` is `did`'s *current* key, as opposed to one that was
    /// valid before a rotation. Distinguishing the two lets callers surface
    /// a clearer error than a bare signature failure.
    pub fn is_current_key(&self, did: &Did, pubkey: &Ed25519PublicKey) -> KeyStatus {
        match self.store.get_document(did) {
            None => KeyStatus::UnknownDid,
            Some(doc) if doc.is_current_key(pubkey) => KeyStatus::Current,
            Some(_) => KeyStatus::Stale,
        }
    }

    pub fn platforms(&self, did: &Did) -> Vec<PlatformLink> {
        self.store
            .get_document(did)
            .map(|d| d.platforms)
            .unwrap_or_default()
    }

    pub fn capabilities(&self, did: &Did) -> Vec<CapabilityCredential> {
        self.store
            .get_document(did)
            .map(|d| d.capabilities)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Current,
    Stale,
    UnknownDid,
}
