use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Did, Timestamp};

use crate::events::ReputationEvent;
use crate::store::ReputationStore;
use crate::types::ReputationRecord;

/// Apply a parsed `ReputationEvent` issued by `issuer` at time `now`.
///
/// Records are append-only and never rejected on fraud grounds (§4.6):
/// self-review, reference validity, burst and circular patterns are
/// detected at query time as non-destructive signals, not enforced here.
pub fn apply(
    event: &ReputationEvent,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ReputationStore,
) -> Result<(), ClawNetError> {
    match event {
        ReputationEvent::Record {
            target,
            dimension,
            score,
            reference,
        } => {
            store.append_record(ReputationRecord {
                target: target.clone(),
                issuer: issuer.clone(),
                dimension: *dimension,
                score: *score,
                reference: reference.clone(),
                recorded_at: now,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        records: HashMap<String, Vec<ReputationRecord>>,
    }

    impl ReputationStore for MemStore {
        fn records_for(&self, target: &Did) -> Vec<ReputationRecord> {
            self.records.get(target.as_str()).cloned().unwrap_or_default()
        }
        fn append_record(&mut self, record: ReputationRecord) {
            self.records
                .entry(record.target.as_str().to_string())
                .or_default()
                .push(record);
        }
    }

    fn did(s: &str) -> Did {
        Did(s.to_string())
    }

    #[test]
    fn record_accumulates_even_for_self_review() {
        let mut store = MemStore::default();
        let agent = did("did:claw:zA");
        apply(
            &ReputationEvent::Record {
                target: agent.clone(),
                dimension: Dimension::Quality,
                score: 900,
                reference: "order-1".into(),
            },
            &agent,
            1000,
            &mut store,
        )
        .unwrap();
        assert_eq!(store.records_for(&agent).len(), 1);
    }
}
