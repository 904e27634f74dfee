use clawnet_core::envelope::Envelope;
use clawnet_core::types::Hash32;
use serde::{Deserialize, Serialize};

/// The outer wire envelope every gossip frame is wrapped in (§2A /
/// GLOSSARY "Gossip boundary"). `payload` carries the canonical-JSON bytes
/// of a `clawnet_core::Envelope` for `ContentType::Event`, or a
/// bincode-encoded `RangeSyncRequest`/`RangeSyncResponse`/`SnapshotChunk`
/// for the other content types — the hash used for `resourcePrev`/nonce
/// bookkeeping is always computed over the inner JSON, never over this
/// outer frame.
///
/// `sig` is carried for wire-format fidelity with the `P2PEnvelope`
/// shape (§2A) but is left empty by this implementation: gossipsub's
/// own `MessageAuthenticity::Signed` already authenticates
/// the frame at the transport layer, and the inner envelope (for
/// `ContentType::Event`) carries its own issuer signature that the state
/// engine verifies independently of transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct P2pEnvelope {
    pub v: u32,
    pub topic: String,
    pub sender: String,
    pub ts: i64,
    pub content_type: ContentType,
    pub payload: Vec<u8>,
    pub sig: Vec<u8>,
}

pub const P2P_ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Event,
    RangeSyncRequest,
    RangeSyncResponse,
    SnapshotChunk,
}

impl P2pEnvelope {
    /// Wrap a signed protocol envelope for gossip, keyed to its topic by
    /// the envelope's own type-family.
    pub fn for_event(
        sender: String,
        ts: i64,
        topic: String,
        envelope: &Envelope,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(envelope)?;
        Ok(Self {
            v: P2P_ENVELOPE_VERSION,
            topic,
            sender,
            ts,
            content_type: ContentType::Event,
            payload: clawnet_core::envelope::canonical_json_bytes(&value),
            sig: Vec::new(),
        })
    }

    pub fn for_control(sender: String, ts: i64, topic: String, content_type: ContentType, payload: &impl Serialize) -> Self {
        Self {
            v: P2P_ENVELOPE_VERSION,
            topic,
            sender,
            ts,
            content_type,
            payload: bincode::serialize(payload).expect("range-sync payload serialization is infallible"),
            sig: Vec::new(),
        }
    }

    /// Recover the inner `Envelope` — only meaningful when `content_type`
    /// is `ContentType::Event`.
    pub fn decode_event(&self) -> Result<Envelope, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// Serialize the outer frame for gossipsub propagation.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("P2pEnvelope serialization is infallible")
    }

    /// Deserialize an outer frame received from gossipsub.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

/// Request a range of envelopes for a resource or issuer chain starting
/// just after `from` (or from genesis if `None`), up to `limit` entries —
/// how a node recovers envelopes the buffering window dropped (§5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSyncRequest {
    pub from: Option<Hash32>,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSyncResponse {
    pub envelopes: Vec<Envelope>,
}

/// One chunk of a full-state snapshot transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotChunk {
    pub seq: u32,
    pub total: u32,
    pub bytes: Vec<u8>,
}
