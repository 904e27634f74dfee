use crate::constants::{
    LOCKUP_MAX_DURATION_SECS, LOCKUP_MAX_MULTIPLIER_BONUS, REPUTATION_MAX_MULTIPLIER_BONUS,
    REPUTATION_SCORE_CEILING,
};
use crate::types::VotingInputs;

/// Integer square root via Newton's method. Deterministic across platforms,
/// unlike a float `sqrt` cast back to an integer.
fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// A voter's base power before delegation adjustments (§4.7).
pub fn base_power(inputs: VotingInputs) -> u128 {
    let token_power = isqrt(inputs.balance);
    let locked_power = isqrt(inputs.locked_tokens);

    let lockup_fraction = (inputs.lockup_duration_secs as f64 / LOCKUP_MAX_DURATION_SECS as f64)
        .clamp(0.0, 1.0);
    let lockup_mul = 1.0 + lockup_fraction * LOCKUP_MAX_MULTIPLIER_BONUS;

    let rep_fraction = (inputs.reputation_score as f64 / REPUTATION_SCORE_CEILING).clamp(0.0, 1.0);
    let rep_mul = 1.0 + rep_fraction * REPUTATION_MAX_MULTIPLIER_BONUS;

    let locked_bonus = locked_power as f64 * (lockup_mul - 1.0);
    let base = (token_power as f64 + locked_bonus) * rep_mul;
    base.round().max(0.0) as u128
}

/// Effective power after subtracting delegated-away shares and adding
/// delegated-in shares. Clamped at zero — a voter's power never goes
/// negative even if every token is delegated out.
pub fn effective_power(base: u128, outgoing_delegated: u128, incoming_delegated: u128) -> u128 {
    base.saturating_sub(outgoing_delegated)
        .saturating_add(incoming_delegated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_matches_known_values() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(99), 9);
        assert_eq!(isqrt(100), 10);
        assert_eq!(isqrt(10_000), 100);
    }

    #[test]
    fn base_power_scales_with_lockup_and_reputation() {
        let no_lockup = VotingInputs {
            balance: 100,
            locked_tokens: 0,
            lockup_duration_secs: 0,
            reputation_score: 0,
        };
        assert_eq!(base_power(no_lockup), 10);

        let full_lockup_full_rep = VotingInputs {
            balance: 0,
            locked_tokens: 100,
            lockup_duration_secs: LOCKUP_MAX_DURATION_SECS,
            reputation_score: 1000,
        };
        // lockedPower=10, lockupMul=3.0, bonus=10*2=20, basePower=20*2.0=40
        assert_eq!(base_power(full_lockup_full_rep), 40);
    }
}
