use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Balance, Did};
use serde_json::Value;

use crate::types::Contract;

#[derive(Clone, Debug)]
pub enum ContractsEvent {
    Create {
        contract: Contract,
    },
    Sign,
    Activate,
    MilestoneSubmit {
        milestone_id: String,
    },
    MilestoneApprove {
        milestone_id: String,
    },
    MilestoneReject {
        milestone_id: String,
    },
    DisputeOpen,
    DisputeResolve {
        provider_amount: Balance,
        client_amount: Balance,
    },
    SettlementExecute {
        counter_signer: Did,
    },
    Terminate,
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

pub fn parse_payload(event_type: &str, payload: &Value) -> Result<ContractsEvent, ClawNetError> {
    match event_type {
        "contract.create" => Ok(ContractsEvent::Create {
            contract: decode(required(payload, "contract")?)?,
        }),
        "contract.sign" => Ok(ContractsEvent::Sign),
        "contract.activate" => Ok(ContractsEvent::Activate),
        "contract.milestone.submit" => Ok(ContractsEvent::MilestoneSubmit {
            milestone_id: decode(required(payload, "milestoneId")?)?,
        }),
        "contract.milestone.approve" => Ok(ContractsEvent::MilestoneApprove {
            milestone_id: decode(required(payload, "milestoneId")?)?,
        }),
        "contract.milestone.reject" => Ok(ContractsEvent::MilestoneReject {
            milestone_id: decode(required(payload, "milestoneId")?)?,
        }),
        "contract.dispute.open" => Ok(ContractsEvent::DisputeOpen),
        "contract.dispute.resolve" => Ok(ContractsEvent::DisputeResolve {
            provider_amount: parse_balance(required(payload, "providerAmount")?)?,
            client_amount: parse_balance(required(payload, "clientAmount")?)?,
        }),
        "contract.settlement.execute" => Ok(ContractsEvent::SettlementExecute {
            counter_signer: decode(required(payload, "counterSigner")?)?,
        }),
        "contract.terminate" => Ok(ContractsEvent::Terminate),
        other => Err(ClawNetError::UnknownEventType(other.to_string())),
    }
}
