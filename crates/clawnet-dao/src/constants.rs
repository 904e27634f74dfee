//! Per-proposal-type governance tiers (§4.7's threshold table). Exact
//! numeric values are themselves DAO-governable in a live deployment; this
//! implementation treats them as fixed protocol constants.

use crate::types::ProposalType;

/// (createThreshold, quorum numerator/100, passThreshold numerator/100).
#[derive(Clone, Copy, Debug)]
pub struct ProposalTier {
    pub create_threshold: u128,
    pub quorum_pct: u64,
    pub pass_pct: u64,
}

const LOW: ProposalTier = ProposalTier {
    create_threshold: 100,
    quorum_pct: 5,
    pass_pct: 50,
};
const MEDIUM: ProposalTier = ProposalTier {
    create_threshold: 1_000,
    quorum_pct: 15,
    pass_pct: 66,
};
const HIGH: ProposalTier = ProposalTier {
    create_threshold: 10_000,
    quorum_pct: 25,
    pass_pct: 75,
};
const EMERGENCY: ProposalTier = ProposalTier {
    create_threshold: 0,
    quorum_pct: 0,
    pass_pct: 0,
};

pub fn tier_for(proposal_type: ProposalType) -> ProposalTier {
    match proposal_type {
        ProposalType::Signal => LOW,
        ProposalType::ParameterChange => MEDIUM,
        ProposalType::TreasurySpend => MEDIUM,
        ProposalType::ProtocolUpgrade => HIGH,
        ProposalType::Emergency => EMERGENCY,
    }
}

pub fn timelock_delay_secs(proposal_type: ProposalType) -> i64 {
    use clawnet_core::constants::{
        TIMELOCK_DELAY_PARAMETER_SECS, TIMELOCK_DELAY_STANDARD_SECS, TIMELOCK_DELAY_TREASURY_SECS,
    };
    match proposal_type {
        ProposalType::Signal => TIMELOCK_DELAY_STANDARD_SECS,
        ProposalType::ParameterChange => TIMELOCK_DELAY_PARAMETER_SECS,
        ProposalType::TreasurySpend => TIMELOCK_DELAY_TREASURY_SECS,
        ProposalType::ProtocolUpgrade => TIMELOCK_DELAY_PARAMETER_SECS,
        ProposalType::Emergency => 0,
    }
}

/// Voting-power formula constants (§4.7).
pub const LOCKUP_MAX_DURATION_SECS: i64 = 4 * 365 * 24 * 3600;
pub const LOCKUP_MAX_MULTIPLIER_BONUS: f64 = 2.0;
pub const REPUTATION_MAX_MULTIPLIER_BONUS: f64 = 1.0;
pub const REPUTATION_SCORE_CEILING: f64 = 1000.0;
