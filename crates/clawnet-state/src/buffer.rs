use std::collections::{BTreeMap, HashMap};

use clawnet_core::constants::NONCE_BUFFER_WINDOW;
use clawnet_core::envelope::Envelope;
use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Did, Nonce, Timestamp};

use crate::engine::StateEngine;

type FamilyKey = (String, String);

/// Result of feeding one envelope to [`OutOfOrderBuffer::ingest`].
pub enum IngestOutcome {
    /// The envelope applied, along with any buffered envelopes it unblocked
    /// (in the order they were applied). Always starts with the envelope
    /// just ingested unless it was itself a harmless re-delivery.
    Applied(Vec<Envelope>),
    /// The envelope's nonce is ahead of what this `(issuer, family)` has
    /// seen; held until the gap closes or the buffer window is exceeded.
    Buffered,
    /// The buffer for this `(issuer, family)` exceeded `NONCE_BUFFER_WINDOW`
    /// and the oldest held envelope was evicted (§5) — the sender must
    /// re-send it via range-sync.
    Dropped { issuer: Did, family: String, nonce: Nonce },
}

/// Holds out-of-order envelopes per `(issuer, type-family)` until their
/// nonce gap closes, so a single late-arriving envelope doesn't force a
/// resync of everything behind it. Resource contention (two envelopes
/// racing for the same `resourcePrev` head) is a different failure mode —
/// the loser gets `ResourcePrevMismatch` back immediately and must rebase,
/// it is never buffered here.
#[derive(Default)]
pub struct OutOfOrderBuffer {
    pending: HashMap<FamilyKey, BTreeMap<Nonce, Envelope>>,
}

impl OutOfOrderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(
        &mut self,
        engine: &mut StateEngine,
        envelope: Envelope,
        now: Timestamp,
    ) -> Result<IngestOutcome, ClawNetError> {
        match engine.validate_and_apply(&envelope, now) {
            Ok(()) => {
                let mut applied = vec![envelope.clone()];
                let family = envelope.type_family().to_string();
                applied.extend(self.drain_ready(engine, &envelope.issuer, &family, now)?);
                Ok(IngestOutcome::Applied(applied))
            }
            Err(ClawNetError::NonceOutOfOrder { expected, got, .. }) if got > expected => {
                let key = (envelope.issuer.to_string(), envelope.type_family().to_string());
                let slot = self.pending.entry(key).or_insert_with(BTreeMap::new);
                slot.insert(envelope.nonce, envelope.clone());

                if slot.len() > NONCE_BUFFER_WINDOW {
                    let oldest_nonce = match slot.keys().next() {
                        Some(n) => *n,
                        None => return Ok(IngestOutcome::Buffered),
                    };
                    slot.remove(&oldest_nonce);
                    return Ok(IngestOutcome::Dropped {
                        issuer: envelope.issuer,
                        family: envelope.type_family().to_string(),
                        nonce: oldest_nonce,
                    });
                }
                Ok(IngestOutcome::Buffered)
            }
            Err(e) => Err(e),
        }
    }

    /// After `issuer`/`family`'s nonce head advances, replay any
    /// contiguously-buffered envelopes that are now next in line.
    fn drain_ready(
        &mut self,
        engine: &mut StateEngine,
        issuer: &Did,
        family: &str,
        now: Timestamp,
    ) -> Result<Vec<Envelope>, ClawNetError> {
        let key = (issuer.to_string(), family.to_string());
        let mut applied = Vec::new();

        loop {
            let candidate = match self.pending.get(&key) {
                Some(slot) => slot.values().next().cloned(),
                None => None,
            };
            let candidate = match candidate {
                Some(env) => env,
                None => break,
            };
            match engine.validate_and_apply(&candidate, now) {
                Ok(()) => {
                    if let Some(slot) = self.pending.get_mut(&key) {
                        slot.remove(&candidate.nonce);
                    }
                    applied.push(candidate);
                }
                Err(_) => break,
            }
        }

        if let Some(slot) = self.pending.get(&key) {
            if slot.is_empty() {
                self.pending.remove(&key);
            }
        }
        Ok(applied)
    }
}
