use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Did, Hash32, Timestamp};
use clawnet_crypto::verify_signature;

use crate::events::IdentityEvent;
use crate::store::IdentityStore;

/// Apply a parsed `IdentityEvent` issued by `issuer` at time `now`.
///
/// Callers are expected to have already run the envelope validation
/// pipeline (hash, signature, nonce, resourcePrev) before reaching this
/// function — preconditions here are the identity-subsystem-specific ones
/// from §4.2.
pub fn apply(
    event: &IdentityEvent,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl IdentityStore,
) -> Result<(), ClawNetError> {
    match event {
        IdentityEvent::Create { document } => apply_create(document, issuer, now, store),
        IdentityEvent::Update {
            document,
            prev_doc_hash,
        } => apply_update(document, *prev_doc_hash, issuer, now, store),
        IdentityEvent::PlatformLink { link } => apply_platform_link(link, issuer, now, store),
        IdentityEvent::CapabilityRegister { capability } => {
            apply_capability_register(capability, issuer, now, store)
        }
    }
}

fn apply_create(
    document: &crate::document::DidDocument,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl IdentityStore,
) -> Result<(), ClawNetError> {
    if &document.did != issuer {
        return Err(ClawNetError::DidKeyBindingMismatch);
    }
    if !document.did.is_bound_to(&document.auth_key.0) {
        return Err(ClawNetError::DidKeyBindingMismatch);
    }
    if store.get_document(issuer).is_some() {
        return Err(ClawNetError::DidAlreadyExists(issuer.as_str().to_string()));
    }
    if document.prev_doc_hash.is_some() {
        return Err(ClawNetError::SchemaInvalid(
            "identity.create must not carry prev_doc_hash".into(),
        ));
    }

    let mut document = document.clone();
    document.created_at = now;
    document.updated_at = now;
    store.put_document(document);
    Ok(())
}

fn apply_update(
    document: &crate::document::DidDocument,
    prev_doc_hash: Hash32,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl IdentityStore,
) -> Result<(), ClawNetError> {
    let existing = store
        .get_document(issuer)
        .ok_or_else(|| ClawNetError::DidNotFound(issuer.as_str().to_string()))?;

    if &document.did != issuer {
        return Err(ClawNetError::SchemaInvalid(
            "identity.update must not change the DID".into(),
        ));
    }

    let existing_bytes = serde_json::to_vec(&existing)
        .map_err(|e| ClawNetError::Serialization(e.to_string()))?;
    let existing_hash = Hash32::of(&existing_bytes);
    if existing_hash != prev_doc_hash {
        return Err(ClawNetError::SchemaInvalid(
            "prev_doc_hash does not match the stored document".into(),
        ));
    }

    // The validation pipeline's signature step already confirmed this
    // envelope was signed by `existing.auth_key` (the *previous* key, per
    // §4.2's rotation rule) — nothing further to check on the key here.

    let mut document = document.clone();
    document.created_at = existing.created_at;
    document.updated_at = now;
    document.prev_doc_hash = Some(prev_doc_hash);
    store.put_document(document);
    Ok(())
}

fn apply_platform_link(
    link: &crate::document::PlatformLink,
    issuer: &Did,
    _now: Timestamp,
    store: &mut impl IdentityStore,
) -> Result<(), ClawNetError> {
    let mut document = store
        .get_document(issuer)
        .ok_or_else(|| ClawNetError::DidNotFound(issuer.as_str().to_string()))?;

    let platform_doc = store
        .get_document(&link.issuer_did)
        .ok_or_else(|| ClawNetError::DidNotFound(link.issuer_did.as_str().to_string()))?;

    let proof_bytes = hex::decode(&link.proof)
        .map_err(|_| ClawNetError::SchemaInvalid("platform link proof is not valid hex".into()))?;
    if proof_bytes.len() != 64 {
        return Err(ClawNetError::SchemaInvalid(
            "platform link proof must be a 64-byte Ed25519 signature".into(),
        ));
    }
    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(&proof_bytes);
    let sig = clawnet_core::types::Ed25519Signature(sig_bytes);

    let message = format!("{}:{}:{}", link.platform, link.external_username, issuer);
    verify_signature(&platform_doc.auth_key, message.as_bytes(), &sig)
        .map_err(|_| ClawNetError::BadSignature)?;

    if document
        .platforms
        .iter()
        .any(|p| p.platform == link.platform)
    {
        return Err(ClawNetError::PlatformLinkAlreadyVerified(
            link.platform.clone(),
        ));
    }

    document.platforms.push(link.clone());
    store.put_document(document);
    Ok(())
}

fn apply_capability_register(
    capability: &crate::document::CapabilityCredential,
    issuer: &Did,
    _now: Timestamp,
    store: &mut impl IdentityStore,
) -> Result<(), ClawNetError> {
    let mut document = store
        .get_document(issuer)
        .ok_or_else(|| ClawNetError::DidNotFound(issuer.as_str().to_string()))?;

    document.capabilities.push(capability.clone());
    store.put_document(document);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DidDocument;
    use clawnet_core::types::Ed25519PublicKey;
    use std::collections::HashMap;

    struct MemStore(HashMap<String, DidDocument>);

    impl IdentityStore for MemStore {
        fn get_document(&self, did: &Did) -> Option<DidDocument> {
            self.0.get(did.as_str()).cloned()
        }
        fn put_document(&mut self, document: DidDocument) {
            self.0.insert(document.did.as_str().to_string(), document);
        }
    }

    fn fresh_document() -> (Did, DidDocument) {
        let keypair = clawnet_crypto::KeyPair::generate();
        let did = keypair.did.clone();
        let document = DidDocument {
            did: did.clone(),
            auth_key: keypair.public_key,
            agreement_key: None,
            platforms: vec![],
            capabilities: vec![],
            prev_doc_hash: None,
            created_at: 0,
            updated_at: 0,
        };
        (did, document)
    }

    #[test]
    fn create_then_duplicate_rejected() {
        let (did, document) = fresh_document();
        let mut store = MemStore(HashMap::new());
        apply_create(&document, &did, 100, &mut store).unwrap();
        let err = apply_create(&document, &did, 200, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::DidAlreadyExists(_)));
    }

    #[test]
    fn create_rejects_unbound_key() {
        let (did, mut document) = fresh_document();
        let other = clawnet_crypto::KeyPair::generate();
        document.auth_key = Ed25519PublicKey(other.public_key.0);
        let mut store = MemStore(HashMap::new());
        let err = apply_create(&document, &did, 100, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::DidKeyBindingMismatch));
    }

    #[test]
    fn update_requires_matching_prev_hash() {
        let (did, document) = fresh_document();
        let mut store = MemStore(HashMap::new());
        apply_create(&document, &did, 100, &mut store).unwrap();

        let bogus_hash = Hash32::of(b"not the real document bytes");
        let err = apply_update(&document, bogus_hash, &did, 200, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::SchemaInvalid(_)));
    }

    #[test]
    fn capability_register_accumulates() {
        let (did, document) = fresh_document();
        let mut store = MemStore(HashMap::new());
        apply_create(&document, &did, 100, &mut store).unwrap();

        let capability = crate::document::CapabilityCredential {
            name: "summarization".to_string(),
            pricing_schema: serde_json::json!({"perCall": "10"}),
            description: None,
            issuer_credential: None,
            registered_at: 0,
        };
        apply_capability_register(&capability, &did, 300, &mut store).unwrap();
        let stored = store.get_document(&did).unwrap();
        assert_eq!(stored.capabilities.len(), 1);
    }
}
