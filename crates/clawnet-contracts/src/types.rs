use clawnet_core::types::{Balance, Did, Timestamp};
use serde::{Deserialize, Serialize};

// ── Parties ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Client,
    Provider,
    Subcontractor,
    Auditor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractParty {
    pub did: Did,
    pub role: PartyRole,
}

// ── Contract status ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    PendingSignature,
    PendingFunding,
    Active,
    Disputed,
    Completed,
    Terminated,
}

/// Allowed contract-status transitions (§4.5's linear state machine, plus
/// the disputed branch).
pub fn contract_transition_allowed(from: ContractStatus, to: ContractStatus) -> bool {
    use ContractStatus::*;
    matches!(
        (from, to),
        (Draft, PendingSignature)
            | (PendingSignature, PendingFunding)
            | (PendingFunding, Active)
            | (Active, Completed)
            | (Active, Disputed)
            | (Disputed, Completed)
            | (Disputed, Terminated)
    )
}

// ── Milestones ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
    Waived,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub sequence: u32,
    pub description: String,
    pub amount: Balance,
    pub status: MilestoneStatus,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub client: Did,
    pub provider: Did,
    #[serde(default)]
    pub other_parties: Vec<ContractParty>,
    pub total: Balance,
    pub escrow_required: bool,
    pub escrow_id: Option<String>,
    pub arbiter: Option<Did>,
    pub status: ContractStatus,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub signatures: Vec<Did>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contract {
    /// Every DID that must sign before the contract can leave
    /// `pending_signature` — client, provider and any listed subcontractors
    /// or auditors.
    pub fn required_signers(&self) -> Vec<Did> {
        let mut signers = vec![self.client.clone(), self.provider.clone()];
        signers.extend(self.other_parties.iter().map(|p| p.did.clone()));
        signers
    }

    pub fn is_party(&self, did: &Did) -> bool {
        &self.client == did
            || &self.provider == did
            || self.other_parties.iter().any(|p| &p.did == did)
    }

    pub fn fully_signed(&self) -> bool {
        self.required_signers()
            .iter()
            .all(|s| self.signatures.contains(s))
    }

    pub fn all_milestones_resolved(&self) -> bool {
        self.milestones.iter().all(|m| {
            matches!(
                m.status,
                MilestoneStatus::Approved | MilestoneStatus::Waived
            )
        })
    }

    pub fn milestone(&self, milestone_id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    pub fn milestone_mut(&mut self, milestone_id: &str) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id == milestone_id)
    }

    /// A milestone is eligible for submission once every milestone before it
    /// in `sequence` order is approved or waived.
    pub fn milestone_is_next(&self, milestone_id: &str) -> bool {
        let Some(target) = self.milestone(milestone_id) else {
            return false;
        };
        self.milestones
            .iter()
            .filter(|m| m.sequence < target.sequence)
            .all(|m| matches!(m.status, MilestoneStatus::Approved | MilestoneStatus::Waived))
    }
}
