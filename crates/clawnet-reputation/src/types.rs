use clawnet_core::types::{Did, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Quality,
    Reliability,
    Timeliness,
    Communication,
    Transaction,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Quality,
        Dimension::Reliability,
        Dimension::Timeliness,
        Dimension::Communication,
        Dimension::Transaction,
    ];

    pub fn weight(self) -> f64 {
        use clawnet_core::constants::*;
        match self {
            Dimension::Quality => REPUTATION_DIMENSION_WEIGHT_QUALITY,
            Dimension::Reliability => REPUTATION_DIMENSION_WEIGHT_RELIABILITY,
            Dimension::Timeliness => REPUTATION_DIMENSION_WEIGHT_TIMELINESS,
            Dimension::Transaction => REPUTATION_DIMENSION_WEIGHT_TRANSACTION,
            Dimension::Communication => REPUTATION_DIMENSION_WEIGHT_COMMUNICATION,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub target: Did,
    pub issuer: Did,
    pub dimension: Dimension,
    /// 0..=1000
    pub score: u16,
    /// Id of the contract, order or lease this record attests to.
    pub reference: String,
    pub recorded_at: Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudSignal {
    SelfReview,
    Burst,
    Circular,
    ReferenceInvalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationLevel {
    Risky,
    Observed,
    Newcomer,
    Trusted,
    Expert,
    Elite,
    Legend,
}

impl ReputationLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=149 => ReputationLevel::Risky,
            150..=249 => ReputationLevel::Observed,
            250..=399 => ReputationLevel::Newcomer,
            400..=599 => ReputationLevel::Trusted,
            600..=799 => ReputationLevel::Expert,
            800..=899 => ReputationLevel::Elite,
            _ => ReputationLevel::Legend,
        }
    }
}
