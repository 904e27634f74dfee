use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClawNetError;
use crate::types::{Did, Ed25519Signature, Hash32, Nonce, Timestamp};

// ── Canonical JSON ────────────────────────────────────────────────────────────

/// Produce the canonical byte encoding of a JSON value: object keys sorted
/// lexicographically at every depth, no insignificant whitespace, and
/// numbers emitted exactly as they appear in the input (payload amounts are
/// expected to already be decimal strings, never JSON numbers, so that no
/// float or big-integer rounding can occur during canonicalization).
///
/// This is the single function that both hashing and signing must go
/// through — any other path to bytes risks a signer/verifier disagreement.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => {
            out.extend_from_slice(serde_json::to_string(s).unwrap().as_bytes())
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(serde_json::to_string(key).unwrap().as_bytes());
                out.push(b':');
                write_canonical(&map[*key], out);
            }
            out.push(b'}');
        }
    }
}

// ── Envelope ───────────────────────────────────────────────────────────────────

/// The canonical signed envelope — the sole unit of state-changing input to
/// every reducer. `hash` and `sig` cover every other field via
/// [`canonical_json_bytes`] of [`Envelope::signing_view`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope format version (see `constants::ENVELOPE_VERSION`).
    pub v: u32,

    /// Dotted event type, e.g. `"wallet.transfer"`, `"dao.vote_cast"`. The
    /// first dot-segment is the event's nonce type-family.
    #[serde(rename = "type")]
    pub event_type: String,

    /// DID of the signing party.
    pub issuer: Did,

    /// Issuer-asserted timestamp (advisory only, ms since epoch).
    pub ts: Timestamp,

    /// Per-`(issuer, type-family)` strictly increasing sequence number.
    pub nonce: Nonce,

    /// Hash of the previous envelope touching the same resource, or `None`
    /// for the resource's first envelope. Enforces per-resource causal
    /// ordering independent of global sequencing.
    #[serde(rename = "resourcePrev", skip_serializing_if = "Option::is_none")]
    pub resource_prev: Option<Hash32>,

    /// Event-specific body. Left as an untyped JSON value at this layer;
    /// each reducer crate parses it into its own typed payload enum after
    /// the envelope itself has been validated.
    pub payload: Value,

    /// BLAKE3 hash over the canonical bytes of every field above.
    pub hash: Hash32,

    /// Ed25519 signature over the same canonical bytes, by `issuer`'s
    /// current authentication key.
    pub sig: Ed25519Signature,
}

/// The subset of an envelope's fields covered by `hash` and `sig`, in the
/// shape that gets canonicalized. Kept as a distinct type (rather than
/// re-serializing `Envelope` and stripping two keys) so there is exactly one
/// code path that can go out of sync between signer and verifier: this
/// struct's field list.
#[derive(Serialize)]
struct SigningView<'a> {
    v: u32,
    #[serde(rename = "type")]
    event_type: &'a str,
    issuer: &'a Did,
    ts: Timestamp,
    nonce: Nonce,
    #[serde(rename = "resourcePrev", skip_serializing_if = "Option::is_none")]
    resource_prev: Option<Hash32>,
    payload: &'a Value,
}

impl Envelope {
    /// Canonical bytes that `hash` must equal BLAKE3-of, and that `sig` must
    /// be a valid Ed25519 signature over.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, ClawNetError> {
        let view = SigningView {
            v: self.v,
            event_type: &self.event_type,
            issuer: &self.issuer,
            ts: self.ts,
            nonce: self.nonce,
            resource_prev: self.resource_prev,
            payload: &self.payload,
        };
        let value = serde_json::to_value(&view)
            .map_err(|e| ClawNetError::Serialization(e.to_string()))?;
        Ok(canonical_json_bytes(&value))
    }

    /// Recompute the hash over `signing_bytes` and compare against the
    /// envelope's declared `hash` field.
    pub fn verify_hash(&self) -> Result<(), ClawNetError> {
        let bytes = self.signing_bytes()?;
        let computed = Hash32::of(&bytes);
        if computed != self.hash {
            return Err(ClawNetError::HashMismatch {
                computed: computed.to_hex(),
                declared: self.hash.to_hex(),
            });
        }
        Ok(())
    }

    /// The type-family used for nonce ordering: the first dot-segment of
    /// `event_type`.
    pub fn type_family(&self) -> &str {
        type_family(&self.event_type)
    }
}

/// Extract the first dot-segment of a dotted event type string.
pub fn type_family(event_type: &str) -> &str {
    event_type.split('.').next().unwrap_or(event_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_json_sorts_keys_at_every_depth() {
        let value = serde_json::json!({
            "b": 1,
            "a": { "z": 1, "y": 2 },
        });
        let bytes = canonical_json_bytes(&value);
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"y":2,"z":1},"b":1}"#
        );
    }

    #[test]
    fn canonical_json_is_whitespace_free() {
        let value = serde_json::json!([1, 2, 3]);
        let bytes = canonical_json_bytes(&value);
        assert_eq!(String::from_utf8(bytes).unwrap(), "[1,2,3]");
    }

    #[test]
    fn type_family_extracts_first_segment() {
        assert_eq!(type_family("wallet.transfer"), "wallet");
        assert_eq!(type_family("dao.vote_cast"), "dao");
        assert_eq!(type_family("noseparator"), "noseparator");
    }
}
