use clawnet_core::types::Did;

use crate::store::ContractsStore;
use crate::types::{Contract, ContractStatus, MilestoneStatus};

/// What a given party should do next for a contract, used to drive agent
/// UIs without re-deriving the state machine client-side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextAction {
    Sign,
    AwaitOtherSignatures,
    Fund,
    SubmitMilestone(usize),
    ApproveMilestone(usize),
    AwaitCounterparty,
    None,
}

pub struct ContractsQuery<'a, S: ContractsStore> {
    store: &'a S,
}

impl<'a, S: ContractsStore> ContractsQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn contract(&self, contract_id: &str) -> Option<Contract> {
        self.store.get_contract(contract_id)
    }

    pub fn signed_parties(&self, contract_id: &str) -> Vec<Did> {
        self.store
            .get_contract(contract_id)
            .map(|c| c.signatures)
            .unwrap_or_default()
    }

    pub fn milestone_status(&self, contract_id: &str, milestone_id: &str) -> Option<MilestoneStatus> {
        self.store
            .get_contract(contract_id)?
            .milestone(milestone_id)
            .map(|m| m.status)
    }

    pub fn next_action(&self, contract_id: &str, party: &Did) -> NextAction {
        let Some(contract) = self.store.get_contract(contract_id) else {
            return NextAction::None;
        };
        if !contract.is_party(party) {
            return NextAction::None;
        }
        match contract.status {
            ContractStatus::Draft | ContractStatus::PendingSignature => {
                if contract.signatures.contains(party) {
                    NextAction::AwaitOtherSignatures
                } else {
                    NextAction::Sign
                }
            }
            ContractStatus::PendingFunding => NextAction::Fund,
            ContractStatus::Active => {
                if party == &contract.provider {
                    contract
                        .milestones
                        .iter()
                        .position(|m| {
                            matches!(m.status, MilestoneStatus::Pending | MilestoneStatus::Rejected)
                                && contract.milestone_is_next(&m.id)
                        })
                        .map(NextAction::SubmitMilestone)
                        .unwrap_or(NextAction::None)
                } else if party == &contract.client {
                    contract
                        .milestones
                        .iter()
                        .position(|m| m.status == MilestoneStatus::Submitted)
                        .map(NextAction::ApproveMilestone)
                        .unwrap_or(NextAction::None)
                } else {
                    NextAction::None
                }
            }
            ContractStatus::Disputed => NextAction::AwaitCounterparty,
            ContractStatus::Completed | ContractStatus::Terminated => NextAction::None,
        }
    }
}
