use crate::types::Contract;

/// Storage seam between this reducer and the engine's durable state.
pub trait ContractsStore {
    fn get_contract(&self, contract_id: &str) -> Option<Contract>;
    fn put_contract(&mut self, contract: Contract);
}
