use clawnet_core::error::ClawNetError;
use clawnet_core::types::Hash32;
use serde::{Deserialize, Serialize};

use crate::document::{CapabilityCredential, DidDocument, PlatformLink};

/// The fully-typed body of every `identity.*` event, parsed from an
/// envelope's raw JSON payload once the envelope itself has been validated.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdentityEvent {
    #[serde(rename = "identity.create")]
    Create { document: DidDocument },

    #[serde(rename = "identity.update")]
    Update {
        document: DidDocument,
        prev_doc_hash: Hash32,
    },

    #[serde(rename = "identity.platform.link")]
    PlatformLink { link: PlatformLink },

    #[serde(rename = "identity.capability.register")]
    CapabilityRegister {
        capability: CapabilityCredential,
    },
}

/// Parse an envelope's `payload` into a typed `IdentityEvent`, given the
/// envelope's dotted `type` string (the payload JSON itself carries no type
/// tag — the envelope's own `type` field is authoritative).
pub fn parse_payload(
    event_type: &str,
    payload: &serde_json::Value,
) -> Result<IdentityEvent, ClawNetError> {
    let tagged = match event_type {
        "identity.create" => serde_json::json!({ "type": "identity.create", "document": payload.get("document").cloned().unwrap_or(serde_json::Value::Null) }),
        "identity.update" => serde_json::json!({
            "type": "identity.update",
            "document": payload.get("document").cloned().unwrap_or(serde_json::Value::Null),
            "prev_doc_hash": payload.get("prevDocHash").cloned().unwrap_or(serde_json::Value::Null),
        }),
        "identity.platform.link" => serde_json::json!({
            "type": "identity.platform.link",
            "link": payload.get("link").cloned().unwrap_or_else(|| payload.clone()),
        }),
        "identity.capability.register" => serde_json::json!({
            "type": "identity.capability.register",
            "capability": payload.get("capability").cloned().unwrap_or_else(|| payload.clone()),
        }),
        other => return Err(ClawNetError::UnknownEventType(other.to_string())),
    };
    serde_json::from_value(tagged).map_err(|e| ClawNetError::SchemaInvalid(e.to_string()))
}
