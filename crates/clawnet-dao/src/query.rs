use clawnet_core::types::{Balance, Timestamp};

use crate::store::DaoStore;
use crate::types::Proposal;

pub struct DaoQuery<'a, S: DaoStore> {
    store: &'a S,
}

#[derive(Clone, Copy, Debug)]
pub struct Tally {
    pub for_power: u128,
    pub against_power: u128,
    pub abstain_power: u128,
}

impl<'a, S: DaoStore> DaoQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn proposal(&self, proposal_id: &str) -> Option<Proposal> {
        self.store.get_proposal(proposal_id)
    }

    pub fn tally(&self, proposal_id: &str) -> Option<Tally> {
        self.store.get_proposal(proposal_id).map(|p| Tally {
            for_power: p.votes_for,
            against_power: p.votes_against,
            abstain_power: p.votes_abstain,
        })
    }

    /// Seconds remaining in the proposal's current phase, or `None` once it
    /// has left the discussion/voting timeline (queued/executed/etc).
    pub fn time_remaining(&self, proposal_id: &str, now: Timestamp) -> Option<i64> {
        use crate::types::ProposalPhase::*;
        let proposal = self.store.get_proposal(proposal_id)?;
        let deadline = match proposal.phase {
            Discussion => proposal.discussion_ends_at,
            Voting => proposal.voting_ends_at,
            Queued => proposal.executable_at?,
            _ => return None,
        };
        Some((deadline - now).max(0))
    }

    pub fn treasury_balance(&self) -> Balance {
        self.store.treasury_balance()
    }
}
