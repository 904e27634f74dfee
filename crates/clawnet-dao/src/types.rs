use clawnet_core::types::{Balance, Did, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Signal,
    ParameterChange,
    TreasurySpend,
    ProtocolUpgrade,
    Emergency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalPhase {
    Draft,
    Discussion,
    Voting,
    Queued,
    Executed,
    Rejected,
    Cancelled,
}

/// The typed action a proposal executes once its timelock elapses. The
/// reducer interprets each variant natively; there is no general VM (§4.7).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalAction {
    Signal,
    ParameterChange { parameter: String, new_value: Value },
    TreasurySpend { to: Did, amount: Balance },
    ProtocolUpgrade { description: String },
    Emergency { description: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub proposer: Did,
    pub proposal_type: ProposalType,
    pub title: String,
    pub action: ProposalAction,
    pub phase: ProposalPhase,
    pub votes_for: u128,
    pub votes_against: u128,
    pub votes_abstain: u128,
    pub created_at: Timestamp,
    pub discussion_ends_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub executable_at: Option<Timestamp>,
}

impl Proposal {
    pub fn total_cast(&self) -> u128 {
        self.votes_for + self.votes_against + self.votes_abstain
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: String,
    pub voter: Did,
    pub choice: VoteChoice,
    pub power: u128,
    pub cast_at: Timestamp,
}

/// A delegation scope of `None` covers every proposal type; `Some(t)`
/// restricts the delegation to proposals of that type. `percentage` is
/// the share (0-100) of the delegator's own base power that moves to
/// the delegate — the delegator keeps the remainder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: Did,
    pub delegate: Did,
    pub scope: Option<ProposalType>,
    pub percentage: u8,
    pub expires_at: Option<Timestamp>,
    pub revoked: bool,
}

impl Delegation {
    pub fn covers(&self, proposal_type: ProposalType, now: Timestamp) -> bool {
        if self.revoked {
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return false;
            }
        }
        match self.scope {
            None => true,
            Some(scope) => scope == proposal_type,
        }
    }
}

/// Inputs the engine gathers from the wallet and reputation reducers to
/// compute a voter's effective power (§4.7's formula) — kept as a plain
/// struct so this crate never depends on wallet/reputation storage.
#[derive(Clone, Copy, Debug)]
pub struct VotingInputs {
    pub balance: Balance,
    pub locked_tokens: Balance,
    pub lockup_duration_secs: i64,
    pub reputation_score: u32,
}
