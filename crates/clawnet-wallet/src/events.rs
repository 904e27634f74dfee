use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Address, Balance, Did};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::ReleaseRule;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum WalletEvent {
    Transfer {
        to: Address,
        amount: Balance,
        fee: Balance,
    },
    EscrowCreate {
        escrow_id: String,
        beneficiary: Address,
        rule: ReleaseRule,
        arbiter: Option<Did>,
        expires_at: Option<i64>,
    },
    EscrowFund {
        escrow_id: String,
        amount: Balance,
    },
    EscrowRelease {
        escrow_id: String,
        amount: Balance,
        provided_signers: Vec<Did>,
    },
    EscrowRefund {
        escrow_id: String,
        amount: Balance,
    },
}

/// Amounts are carried as decimal strings, never JSON numbers (§3, §6) — no
/// other numeric representation can round-trip through canonical JSON
/// without risk of silent precision loss.
fn parse_balance(value: &Value) -> Result<Balance, ClawNetError> {
    let s = value
        .as_str()
        .ok_or_else(|| ClawNetError::SchemaInvalid("amount must be a decimal string".into()))?;
    s.parse::<Balance>()
        .map_err(|_| ClawNetError::SchemaInvalid(format!("not a valid decimal amount: {s}")))
}

fn required_field<'a>(payload: &'a Value, field: &'static str) -> Result<&'a Value, ClawNetError> {
    payload
        .get(field)
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("missing field `{field}`")))
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ClawNetError> {
    serde_json::from_value(value.clone()).map_err(|e| ClawNetError::SchemaInvalid(e.to_string()))
}

pub fn parse_payload(
    event_type: &str,
    payload: &Value,
) -> Result<WalletEvent, ClawNetError> {
    match event_type {
        "wallet.transfer" => Ok(WalletEvent::Transfer {
            to: decode(required_field(payload, "to")?)?,
            amount: parse_balance(required_field(payload, "amount")?)?,
            fee: match payload.get("fee") {
                Some(v) => parse_balance(v)?,
                None => 0,
            },
        }),
        "wallet.escrow.create" => Ok(WalletEvent::EscrowCreate {
            escrow_id: decode(required_field(payload, "escrowId")?)?,
            beneficiary: decode(required_field(payload, "beneficiary")?)?,
            rule: decode(required_field(payload, "rule")?)?,
            arbiter: payload.get("arbiter").map(decode).transpose()?,
            expires_at: payload.get("expiresAt").map(decode).transpose()?,
        }),
        "wallet.escrow.fund" => Ok(WalletEvent::EscrowFund {
            escrow_id: decode(required_field(payload, "escrowId")?)?,
            amount: parse_balance(required_field(payload, "amount")?)?,
        }),
        "wallet.escrow.release" => Ok(WalletEvent::EscrowRelease {
            escrow_id: decode(required_field(payload, "escrowId")?)?,
            amount: parse_balance(required_field(payload, "amount")?)?,
            provided_signers: match payload.get("signers") {
                Some(v) => decode(v)?,
                None => Vec::new(),
            },
        }),
        "wallet.escrow.refund" => Ok(WalletEvent::EscrowRefund {
            escrow_id: decode(required_field(payload, "escrowId")?)?,
            amount: parse_balance(required_field(payload, "amount")?)?,
        }),
        other => Err(ClawNetError::UnknownEventType(other.to_string())),
    }
}
