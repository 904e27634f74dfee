use clawnet_core::envelope::type_family;
use clawnet_core::error::ClawNetError;
use clawnet_core::types::Did;
use serde_json::Value;

/// The resource-chain identity a given envelope addresses, used to enforce
/// per-resource causal ordering via `resourcePrev` (§4.1, §5). Not every
/// event type participates in a resource chain — append-only subsystems
/// (reputation) and pure balance transfers rely on nonce ordering alone.
pub fn resource_id_for(
    event_type: &str,
    issuer: &Did,
    payload: &Value,
) -> Result<Option<String>, ClawNetError> {
    match type_family(event_type) {
        "identity" => Ok(Some(format!("identity:{issuer}"))),

        "wallet" => {
            if event_type.starts_with("wallet.escrow") {
                Ok(Some(format!("escrow:{}", required_str(payload, "escrowId")?)))
            } else {
                Ok(None)
            }
        }

        "market" => match event_type {
            "market.listing.publish" => {
                let id = required_str(nested(payload, "listing")?, "id")?;
                Ok(Some(format!("listing:{id}")))
            }
            "market.listing.update" => {
                Ok(Some(format!("listing:{}", required_str(payload, "listingId")?)))
            }
            "market.task.bid.accept" => {
                Ok(Some(format!("listing:{}", required_str(payload, "listingId")?)))
            }
            "market.order.create" | "market.order.update" | "market.order.review"
            | "market.dispute.open" => {
                Ok(Some(format!("order:{}", required_str(payload, "orderId")?)))
            }
            "market.task.bid.create" => {
                let id = required_str(nested(payload, "bid")?, "id")?;
                Ok(Some(format!("bid:{id}")))
            }
            "market.capability.lease" => {
                let id = required_str(nested(payload, "lease")?, "id")?;
                Ok(Some(format!("lease:{id}")))
            }
            "market.capability.usage" => {
                Ok(Some(format!("lease:{}", required_str(payload, "leaseId")?)))
            }
            other => Err(ClawNetError::UnknownEventType(other.to_string())),
        },

        "contract" => Ok(Some(format!("contract:{}", contract_id_of(event_type, payload)?))),

        "reputation" => Ok(None),

        "dao" => match event_type {
            "dao.delegate.set" | "dao.delegate.revoke" => Ok(Some(format!("delegation:{issuer}"))),
            "dao.treasury.deposit" | "dao.treasury.spend" => Ok(Some("treasury".to_string())),
            _ => Ok(Some(format!("proposal:{}", proposal_id_of(event_type, payload)?))),
        },

        other => Err(ClawNetError::UnknownEventType(format!("{other}.*"))),
    }
}

/// `contractId` is carried as a top-level payload field on every
/// `contract.*` event except `contract.create`, where the id lives inside
/// the embedded `contract` object (and is duplicated into a top-level
/// `contractId` too, so the engine never has to special-case create when
/// dispatching to the reducer).
pub fn contract_id_of(event_type: &str, payload: &Value) -> Result<String, ClawNetError> {
    if let Some(id) = payload.get("contractId").and_then(|v| v.as_str()) {
        return Ok(id.to_string());
    }
    if event_type == "contract.create" {
        return Ok(required_str(nested(payload, "contract")?, "id")?.to_string());
    }
    Err(ClawNetError::SchemaInvalid("missing field `contractId`".into()))
}

/// Same convention as `contract_id_of`, for `dao.proposal.*` events.
pub fn proposal_id_of(event_type: &str, payload: &Value) -> Result<String, ClawNetError> {
    if let Some(id) = payload.get("proposalId").and_then(|v| v.as_str()) {
        return Ok(id.to_string());
    }
    if event_type == "dao.proposal.create" {
        return Ok(required_str(nested(payload, "proposal")?, "id")?.to_string());
    }
    Err(ClawNetError::SchemaInvalid("missing field `proposalId`".into()))
}

fn nested<'a>(payload: &'a Value, field: &'static str) -> Result<&'a Value, ClawNetError> {
    payload
        .get(field)
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("missing field `{field}`")))
}

fn required_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, ClawNetError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("missing field `{field}`")))
}
