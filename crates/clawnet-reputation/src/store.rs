use clawnet_core::types::Did;

use crate::types::ReputationRecord;

/// Storage seam between this reducer and the engine's durable state.
pub trait ReputationStore {
    fn records_for(&self, target: &Did) -> Vec<ReputationRecord>;
    fn append_record(&mut self, record: ReputationRecord);
}
