use clawnet_core::types::{Did, Timestamp};
use serde::{Deserialize, Serialize};

/// Declarative escrow release condition (§4.3). Evaluated by the pure
/// predicate [`condition_met`], never by side-effecting code, so a caller
/// can check whether a release would be authorized before submitting the
/// event.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReleaseRule {
    Manual,
    TimeAfter {
        ts: Timestamp,
    },
    Milestone {
        contract_id: String,
        milestone_id: String,
    },
    MultiSig {
        signers: Vec<Did>,
        threshold: u32,
    },
    Compound {
        op: BoolOp,
        conditions: Vec<ReleaseRule>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    And,
    Or,
}

/// Context needed to evaluate a [`ReleaseRule`] without the rule evaluator
/// touching storage directly. `milestone_approved` lets the wallet reducer
/// check contract-subsystem state without depending on the contracts crate.
pub struct ConditionContext<'a> {
    pub now: Timestamp,
    pub milestone_approved: &'a dyn Fn(&str, &str) -> bool,
    pub provided_signers: &'a [Did],
}

/// Pure predicate: does `rule` currently authorize release?
pub fn condition_met(rule: &ReleaseRule, ctx: &ConditionContext) -> bool {
    match rule {
        ReleaseRule::Manual => true,
        ReleaseRule::TimeAfter { ts } => ctx.now >= *ts,
        ReleaseRule::Milestone {
            contract_id,
            milestone_id,
        } => (ctx.milestone_approved)(contract_id, milestone_id),
        ReleaseRule::MultiSig { signers, threshold } => {
            let signed = signers
                .iter()
                .filter(|s| ctx.provided_signers.contains(s))
                .count() as u32;
            signed >= *threshold
        }
        ReleaseRule::Compound { op, conditions } => match op {
            BoolOp::And => conditions.iter().all(|c| condition_met(c, ctx)),
            BoolOp::Or => conditions.iter().any(|c| condition_met(c, ctx)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_and_requires_both() {
        let rule = ReleaseRule::Compound {
            op: BoolOp::And,
            conditions: vec![
                ReleaseRule::Milestone {
                    contract_id: "c1".into(),
                    milestone_id: "m1".into(),
                },
                ReleaseRule::TimeAfter { ts: 1_000 },
            ],
        };

        let milestone_approved = |_: &str, _: &str| true;
        let not_yet = ConditionContext {
            now: 500,
            milestone_approved: &milestone_approved,
            provided_signers: &[],
        };
        assert!(!condition_met(&rule, &not_yet));

        let ready = ConditionContext {
            now: 1_500,
            milestone_approved: &milestone_approved,
            provided_signers: &[],
        };
        assert!(condition_met(&rule, &ready));
    }

    #[test]
    fn multisig_threshold() {
        let a = Did("did:claw:za".into());
        let b = Did("did:claw:zb".into());
        let c = Did("did:claw:zc".into());
        let rule = ReleaseRule::MultiSig {
            signers: vec![a.clone(), b.clone(), c.clone()],
            threshold: 2,
        };
        let milestone_approved = |_: &str, _: &str| false;
        let ctx = ConditionContext {
            now: 0,
            milestone_approved: &milestone_approved,
            provided_signers: &[a],
        };
        assert!(!condition_met(&rule, &ctx));
        let ctx2 = ConditionContext {
            now: 0,
            milestone_approved: &milestone_approved,
            provided_signers: &[b, c],
        };
        assert!(condition_met(&rule, &ctx2));
    }
}
