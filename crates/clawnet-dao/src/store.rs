use clawnet_core::types::{Balance, Did};

use crate::types::{Delegation, Proposal, Vote};

/// Storage seam between this reducer and the engine's durable state.
pub trait DaoStore {
    fn get_proposal(&self, proposal_id: &str) -> Option<Proposal>;
    fn put_proposal(&mut self, proposal: Proposal);

    fn has_voted(&self, proposal_id: &str, voter: &Did) -> bool;
    fn record_vote(&mut self, vote: Vote);

    /// At most one active delegation per delegator — setting a new one
    /// replaces any prior delegation from the same DID.
    fn get_delegation(&self, delegator: &Did) -> Option<Delegation>;
    fn put_delegation(&mut self, delegation: Delegation);

    fn treasury_balance(&self) -> Balance;
    fn set_treasury_balance(&mut self, balance: Balance);
}
