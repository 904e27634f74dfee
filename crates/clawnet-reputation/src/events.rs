use clawnet_core::error::ClawNetError;
use clawnet_core::types::Did;
use serde_json::Value;

use crate::types::Dimension;

#[derive(Clone, Debug)]
pub enum ReputationEvent {
    Record {
        target: Did,
        dimension: Dimension,
        score: u16,
        reference: String,
    },
}

fn required<'a>(payload: &'a Value, field: &'static str) -> Result<&'a Value, ClawNetError> {
    payload
        .get(field)
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("missing field `{field}`")))
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ClawNetError> {
    serde_json::from_value(value.clone()).map_err(|e| ClawNetError::SchemaInvalid(e.to_string()))
}

pub fn parse_payload(event_type: &str, payload: &Value) -> Result<ReputationEvent, ClawNetError> {
    match event_type {
        "reputation.record" => {
            let score: u16 = decode(required(payload, "score")?)?;
            if score > 1000 {
                return Err(ClawNetError::SchemaInvalid(
                    "reputation score must be in 0..=1000".into(),
                ));
            }
            Ok(ReputationEvent::Record {
                target: decode(required(payload, "target")?)?,
                dimension: decode(required(payload, "dimension")?)?,
                score,
                reference: decode(required(payload, "reference")?)?,
            })
        }
        other => Err(ClawNetError::UnknownEventType(other.to_string())),
    }
}
