use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Balance, Did};
use serde_json::Value;

use crate::types::{Proposal, VoteChoice};

#[derive(Clone, Debug)]
pub enum DaoEvent {
    ProposalCreate {
        proposal: Proposal,
    },
    ProposalAdvance,
    VoteCast {
        choice: VoteChoice,
    },
    DelegateSet {
        delegate: Did,
        scope: Option<crate::types::ProposalType>,
        percentage: u8,
        expires_at: Option<clawnet_core::types::Timestamp>,
    },
    DelegateRevoke {
        delegate: Did,
    },
    TimelockQueue,
    TimelockExecute,
    TimelockCancel,
    TreasuryDeposit {
        amount: Balance,
    },
    TreasurySpend {
        to: Did,
        amount: Balance,
    },
}

fn parse_balance(value: &Value) -> Result<Balance, ClawNetError> {
    value
        .as_str()
        .ok_or_else(|| ClawNetError::SchemaInvalid("amount must be a decimal string".into()))?
        .parse::<Balance>()
        .map_err(|_| ClawNetError::SchemaInvalid("not a valid decimal amount".into()))
}

fn required<'a>(payload: &'a Value, field: &'static str) -> Result<&'a Value, ClawNetError> {
    payload
        .get(field)
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("missing field `{field}`")))
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ClawNetError> {
    serde_json::from_value(value.clone()).map_err(|e| ClawNetError::SchemaInvalid(e.to_string()))
}

pub fn parse_payload(event_type: &str, payload: &Value) -> Result<DaoEvent, ClawNetError> {
    match event_type {
        "dao.proposal.create" => Ok(DaoEvent::ProposalCreate {
            proposal: decode(required(payload, "proposal")?)?,
        }),
        "dao.proposal.advance" => Ok(DaoEvent::ProposalAdvance),
        "dao.vote.cast" => Ok(DaoEvent::VoteCast {
            choice: decode(required(payload, "choice")?)?,
        }),
        "dao.delegate.set" => Ok(DaoEvent::DelegateSet {
            delegate: decode(required(payload, "delegate")?)?,
            scope: payload.get("scope").map(decode).transpose()?,
            percentage: decode(required(payload, "percentage")?)?,
            expires_at: payload.get("expiresAt").map(decode).transpose()?,
        }),
        "dao.delegate.revoke" => Ok(DaoEvent::DelegateRevoke {
            delegate: decode(required(payload, "delegate")?)?,
        }),
        "dao.timelock.queue" => Ok(DaoEvent::TimelockQueue),
        "dao.timelock.execute" => Ok(DaoEvent::TimelockExecute),
        "dao.timelock.cancel" => Ok(DaoEvent::TimelockCancel),
        "dao.treasury.deposit" => Ok(DaoEvent::TreasuryDeposit {
            amount: parse_balance(required(payload, "amount")?)?,
        }),
        "dao.treasury.spend" => Ok(DaoEvent::TreasurySpend {
            to: decode(required(payload, "to")?)?,
            amount: parse_balance(required(payload, "amount")?)?,
        }),
        other => Err(ClawNetError::UnknownEventType(other.to_string())),
    }
}
