use std::collections::BTreeMap;

use clawnet_core::constants::{
    FRAUD_BURST_THRESHOLD, FRAUD_BURST_WINDOW_SECS, FRAUD_CIRCULAR_WINDOW_SECS,
    REPUTATION_BASELINE_SCORE, REPUTATION_MAX_AGE_DAYS, REPUTATION_MIN_WEIGHT,
};
use clawnet_core::types::{Did, Timestamp};

use crate::store::ReputationStore;
use crate::types::{Dimension, FraudSignal, ReputationLevel, ReputationRecord, RiskLevel};

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Clone, Debug)]
pub struct ReputationProfile {
    pub per_dimension: BTreeMap<Dimension, u32>,
    pub overall: u32,
    pub level: ReputationLevel,
    pub signals: Vec<FraudSignal>,
    pub risk: RiskLevel,
}

pub struct ReputationQuery<'a, S: ReputationStore> {
    store: &'a S,
}

impl<'a, S: ReputationStore> ReputationQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Half-life decay weight for a record `age_days` old.
    fn weight_for_age(age_days: f64, half_life_days: f64) -> f64 {
        (2f64).powf(-age_days / half_life_days).max(REPUTATION_MIN_WEIGHT)
    }

    fn live_records(&self, target: &Did, now: Timestamp) -> Vec<ReputationRecord> {
        self.store
            .records_for(target)
            .into_iter()
            .filter(|r| {
                let age_days = (now - r.recorded_at) as f64 / SECS_PER_DAY;
                age_days >= 0.0 && age_days <= REPUTATION_MAX_AGE_DAYS
            })
            .collect()
    }

    fn dimension_score(
        &self,
        records: &[ReputationRecord],
        dimension: Dimension,
        now: Timestamp,
        half_life_days: f64,
    ) -> u32 {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for r in records.iter().filter(|r| r.dimension == dimension) {
            let age_days = (now - r.recorded_at) as f64 / SECS_PER_DAY;
            let w = Self::weight_for_age(age_days, half_life_days);
            weighted_sum += r.score as f64 * w;
            weight_total += w;
        }
        if weight_total <= 0.0 {
            REPUTATION_BASELINE_SCORE.round() as u32
        } else {
            (weighted_sum / weight_total).round() as u32
        }
    }

    /// Compute the full derived profile for `target` at time `now`, given
    /// `half_life_days` (defaults to the protocol constant in the engine)
    /// and a `reference_completed` lookup against other reducers' state.
    pub fn profile(
        &self,
        target: &Did,
        now: Timestamp,
        half_life_days: f64,
        reference_completed: &dyn Fn(&str) -> bool,
    ) -> ReputationProfile {
        let records = self.live_records(target, now);

        let mut per_dimension = BTreeMap::new();
        let mut overall = 0.0f64;
        for dimension in Dimension::ALL {
            let score = self.dimension_score(&records, dimension, now, half_life_days);
            overall += score as f64 * dimension.weight();
            per_dimension.insert(dimension, score);
        }
        let overall = overall.round() as u32;
        let level = ReputationLevel::from_score(overall);

        let all_for_target = self.store.records_for(target);
        let mut signals = Vec::new();

        if all_for_target.iter().any(|r| &r.issuer == target) {
            signals.push(FraudSignal::SelfReview);
        }

        let burst_count = all_for_target
            .iter()
            .filter(|r| (now - r.recorded_at) <= FRAUD_BURST_WINDOW_SECS)
            .count();
        if burst_count > FRAUD_BURST_THRESHOLD {
            signals.push(FraudSignal::Burst);
        }

        if all_for_target.iter().any(|ab| {
            let issuer = &ab.issuer;
            self.store.records_for(issuer).iter().any(|ba| {
                &ba.target == target
                    && (ba.recorded_at - ab.recorded_at).abs() <= FRAUD_CIRCULAR_WINDOW_SECS
            })
        }) {
            signals.push(FraudSignal::Circular);
        }

        if all_for_target
            .iter()
            .any(|r| !reference_completed(&r.reference))
        {
            signals.push(FraudSignal::ReferenceInvalid);
        }

        let risk = if signals.contains(&FraudSignal::SelfReview) || signals.contains(&FraudSignal::Circular) {
            RiskLevel::High
        } else if signals.contains(&FraudSignal::Burst) || signals.contains(&FraudSignal::ReferenceInvalid) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        ReputationProfile {
            per_dimension,
            overall,
            level,
            signals,
            risk,
        }
    }
}
