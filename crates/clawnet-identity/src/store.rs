use clawnet_core::types::Did;

use crate::document::DidDocument;

/// Storage seam between this reducer and the engine's durable state. The
/// engine implements this trait against its own storage tree; the reducer
/// never touches storage directly, so it stays a pure function of
/// `(event, store)`.
pub trait IdentityStore {
    fn get_document(&self, did: &Did) -> Option<DidDocument>;
    fn put_document(&mut self, document: DidDocument);
}
