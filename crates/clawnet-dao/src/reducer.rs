use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Did, Timestamp};

use crate::constants::{timelock_delay_secs, tier_for};
use crate::effects::DaoEffect;
use crate::events::DaoEvent;
use crate::store::DaoStore;
use crate::types::{Delegation, Proposal, ProposalAction, ProposalPhase, Vote, VoteChoice};

const MAX_DELEGATION_CHAIN_WALK: usize = 64;

/// Apply a parsed `DaoEvent` on `proposal_id` (ignored for delegation and
/// treasury events), issued by `issuer` at time `now`.
///
/// `voting_power` is the caller's effective power at `now`, computed by the
/// engine from the wallet and reputation reducers' state (§4.7) — this
/// crate never reaches across subsystems directly.
#[allow(clippy::too_many_arguments)]
pub fn apply(
    event: &DaoEvent,
    proposal_id: &str,
    issuer: &Did,
    now: Timestamp,
    voting_power: u128,
    total_registered_power: u128,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    match event {
        DaoEvent::ProposalCreate { proposal } => {
            apply_proposal_create(proposal, issuer, voting_power, now, store)
        }
        DaoEvent::ProposalAdvance => {
            apply_proposal_advance(proposal_id, now, total_registered_power, store)
        }
        DaoEvent::VoteCast { choice } => {
            apply_vote_cast(proposal_id, issuer, *choice, voting_power, now, store)
        }
        DaoEvent::DelegateSet {
            delegate,
            scope,
            percentage,
            expires_at,
        } => apply_delegate_set(issuer, delegate, *scope, *percentage, *expires_at, store),
        DaoEvent::DelegateRevoke { delegate } => apply_delegate_revoke(issuer, delegate, store),
        DaoEvent::TimelockQueue => apply_timelock_queue(proposal_id, now, store),
        DaoEvent::TimelockExecute => apply_timelock_execute(proposal_id, now, store),
        DaoEvent::TimelockCancel => apply_timelock_cancel(proposal_id, store),
        DaoEvent::TreasuryDeposit { amount } => apply_treasury_deposit(*amount, store),
        DaoEvent::TreasurySpend { amount, .. } => apply_treasury_spend(*amount, store),
    }
}

fn apply_proposal_create(
    proposal: &Proposal,
    issuer: &Did,
    voting_power: u128,
    now: Timestamp,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    if &proposal.proposer != issuer {
        return Err(ClawNetError::SchemaInvalid(
            "proposer must match the issuing DID".into(),
        ));
    }
    if store.get_proposal(&proposal.id).is_some() {
        return Err(ClawNetError::SchemaInvalid(format!(
            "proposal {} already exists",
            proposal.id
        )));
    }
    let tier = tier_for(proposal.proposal_type);
    if voting_power < tier.create_threshold {
        return Err(ClawNetError::ProposalThresholdUnmet);
    }

    let mut proposal = proposal.clone();
    proposal.phase = ProposalPhase::Discussion;
    proposal.votes_for = 0;
    proposal.votes_against = 0;
    proposal.votes_abstain = 0;
    proposal.created_at = now;
    proposal.executable_at = None;
    store.put_proposal(proposal);
    Ok(vec![])
}

fn apply_vote_cast(
    proposal_id: &str,
    issuer: &Did,
    choice: VoteChoice,
    voting_power: u128,
    now: Timestamp,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let mut proposal = store
        .get_proposal(proposal_id)
        .ok_or_else(|| ClawNetError::ProposalNotFound(proposal_id.to_string()))?;
    if proposal.phase != ProposalPhase::Voting {
        return Err(ClawNetError::ProposalNotOpen);
    }
    if store.has_voted(proposal_id, issuer) {
        return Err(ClawNetError::AlreadyVoted);
    }

    match choice {
        VoteChoice::For => proposal.votes_for += voting_power,
        VoteChoice::Against => proposal.votes_against += voting_power,
        VoteChoice::Abstain => proposal.votes_abstain += voting_power,
    }
    store.record_vote(Vote {
        proposal_id: proposal_id.to_string(),
        voter: issuer.clone(),
        choice,
        power: voting_power,
        cast_at: now,
    });
    store.put_proposal(proposal);
    Ok(vec![])
}

/// Moves a proposal through `discussion → voting → queued → executed` (or
/// `rejected`), one phase per `advance` event, gated on elapsed windows and
/// (for `voting → queued`) quorum and pass thresholds (§4.7).
fn apply_proposal_advance(
    proposal_id: &str,
    now: Timestamp,
    total_registered_power: u128,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let mut proposal = store
        .get_proposal(proposal_id)
        .ok_or_else(|| ClawNetError::ProposalNotFound(proposal_id.to_string()))?;

    match proposal.phase {
        ProposalPhase::Discussion => {
            if now < proposal.discussion_ends_at {
                return Err(ClawNetError::ProposalNotOpen);
            }
            proposal.phase = ProposalPhase::Voting;
        }
        ProposalPhase::Voting => {
            if now < proposal.voting_ends_at {
                return Err(ClawNetError::ProposalNotOpen);
            }
            let tier = tier_for(proposal.proposal_type);
            let quorum_met = total_registered_power == 0
                || proposal.total_cast() * 100 >= total_registered_power * tier.quorum_pct as u128;
            let cast = proposal.votes_for + proposal.votes_against;
            let passed = cast > 0 && proposal.votes_for * 100 >= cast * tier.pass_pct as u128;

            if quorum_met && passed {
                proposal.phase = ProposalPhase::Queued;
                proposal.executable_at =
                    Some(now + timelock_delay_secs(proposal.proposal_type));
            } else {
                proposal.phase = ProposalPhase::Rejected;
            }
        }
        _ => return Err(ClawNetError::ProposalNotOpen),
    }

    store.put_proposal(proposal);
    Ok(vec![])
}

fn apply_delegate_set(
    delegator: &Did,
    delegate: &Did,
    scope: Option<crate::types::ProposalType>,
    percentage: u8,
    expires_at: Option<Timestamp>,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    if delegator == delegate {
        return Err(ClawNetError::SelfDelegation);
    }
    if percentage > 100 {
        return Err(ClawNetError::SchemaInvalid(
            "delegation percentage must be between 0 and 100".into(),
        ));
    }
    if would_cycle(delegator, delegate, store) {
        return Err(ClawNetError::DelegationCycle(delegate.to_string()));
    }
    store.put_delegation(Delegation {
        delegator: delegator.clone(),
        delegate: delegate.clone(),
        scope,
        percentage,
        expires_at,
        revoked: false,
    });
    Ok(vec![])
}

fn would_cycle(delegator: &Did, delegate: &Did, store: &impl DaoStore) -> bool {
    let mut current = delegate.clone();
    for _ in 0..MAX_DELEGATION_CHAIN_WALK {
        if &current == delegator {
            return true;
        }
        match store.get_delegation(&current) {
            Some(d) if !d.revoked => current = d.delegate,
            _ => return false,
        }
    }
    true
}

fn apply_delegate_revoke(
    delegator: &Did,
    delegate: &Did,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let mut delegation = store
        .get_delegation(delegator)
        .filter(|d| &d.delegate == delegate)
        .ok_or_else(|| ClawNetError::SchemaInvalid("no active delegation to revoke".into()))?;
    delegation.revoked = true;
    store.put_delegation(delegation);
    Ok(vec![])
}

fn apply_timelock_queue(
    proposal_id: &str,
    now: Timestamp,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let mut proposal = store
        .get_proposal(proposal_id)
        .ok_or_else(|| ClawNetError::ProposalNotFound(proposal_id.to_string()))?;
    if proposal.phase != ProposalPhase::Queued {
        return Err(ClawNetError::ProposalNotApproved);
    }
    if proposal.executable_at.is_none() {
        proposal.executable_at = Some(now + timelock_delay_secs(proposal.proposal_type));
    }
    store.put_proposal(proposal);
    Ok(vec![])
}

fn apply_timelock_execute(
    proposal_id: &str,
    now: Timestamp,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let mut proposal = store
        .get_proposal(proposal_id)
        .ok_or_else(|| ClawNetError::ProposalNotFound(proposal_id.to_string()))?;
    if proposal.phase != ProposalPhase::Queued {
        return Err(ClawNetError::ProposalNotApproved);
    }
    let executable_at = proposal
        .executable_at
        .ok_or(ClawNetError::ProposalNotApproved)?;
    if now < executable_at {
        return Err(ClawNetError::TimelockNotElapsed { executable_at });
    }

    let effects = match &proposal.action {
        ProposalAction::Signal | ProposalAction::Emergency { .. } => vec![],
        ProposalAction::ParameterChange {
            parameter,
            new_value,
        } => vec![DaoEffect::ApplyParameterChange {
            parameter: parameter.clone(),
            new_value: new_value.clone(),
        }],
        ProposalAction::ProtocolUpgrade { description } => {
            vec![DaoEffect::ApplyProtocolUpgrade {
                description: description.clone(),
            }]
        }
        ProposalAction::TreasurySpend { to, amount } => vec![DaoEffect::ExecuteTreasurySpend {
            to: to.clone(),
            amount: *amount,
        }],
    };

    proposal.phase = ProposalPhase::Executed;
    store.put_proposal(proposal);
    Ok(effects)
}

fn apply_timelock_cancel(
    proposal_id: &str,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let mut proposal = store
        .get_proposal(proposal_id)
        .ok_or_else(|| ClawNetError::ProposalNotFound(proposal_id.to_string()))?;
    if proposal.phase != ProposalPhase::Queued {
        return Err(ClawNetError::ProposalAlreadyExecuted);
    }
    proposal.phase = ProposalPhase::Cancelled;
    store.put_proposal(proposal);
    Ok(vec![])
}

fn apply_treasury_deposit(
    amount: clawnet_core::types::Balance,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let balance = store.treasury_balance();
    store.set_treasury_balance(balance + amount);
    Ok(vec![])
}

fn apply_treasury_spend(
    amount: clawnet_core::types::Balance,
    store: &mut impl DaoStore,
) -> Result<Vec<DaoEffect>, ClawNetError> {
    let balance = store.treasury_balance();
    if amount > balance {
        return Err(ClawNetError::TreasuryInsufficientBalance {
            need: amount,
            have: balance,
        });
    }
    store.set_treasury_balance(balance - amount);
    Ok(vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProposalType;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct MemStore {
        proposals: HashMap<String, Proposal>,
        votes: HashSet<(String, String)>,
        delegations: HashMap<String, Delegation>,
        treasury: u128,
    }

    impl DaoStore for MemStore {
        fn get_proposal(&self, id: &str) -> Option<Proposal> {
            self.proposals.get(id).cloned()
        }
        fn put_proposal(&mut self, proposal: Proposal) {
            self.proposals.insert(proposal.id.clone(), proposal);
        }
        fn has_voted(&self, proposal_id: &str, voter: &Did) -> bool {
            self.votes
                .contains(&(proposal_id.to_string(), voter.as_str().to_string()))
        }
        fn record_vote(&mut self, vote: Vote) {
            self.votes
                .insert((vote.proposal_id, vote.voter.as_str().to_string()));
        }
        fn get_delegation(&self, delegator: &Did) -> Option<Delegation> {
            self.delegations.get(delegator.as_str()).cloned()
        }
        fn put_delegation(&mut self, delegation: Delegation) {
            self.delegations
                .insert(delegation.delegator.as_str().to_string(), delegation);
        }
        fn treasury_balance(&self) -> u128 {
            self.treasury
        }
        fn set_treasury_balance(&mut self, balance: u128) {
            self.treasury = balance;
        }
    }

    fn did(s: &str) -> Did {
        Did(s.to_string())
    }

    fn base_proposal() -> Proposal {
        Proposal {
            id: "p-1".into(),
            proposer: did("did:claw:zProposer"),
            proposal_type: ProposalType::Signal,
            title: "bump fee".into(),
            action: ProposalAction::Signal,
            phase: ProposalPhase::Draft,
            votes_for: 0,
            votes_against: 0,
            votes_abstain: 0,
            created_at: 0,
            discussion_ends_at: 0,
            voting_ends_at: 100,
            executable_at: None,
        }
    }

    #[test]
    fn voting_quorum_and_pass_threshold_queue_a_proposal() {
        let mut store = MemStore::default();
        let proposer = did("did:claw:zProposer");
        apply_proposal_create(&base_proposal(), &proposer, 200, 0, &mut store).unwrap();

        let mut proposal = store.get_proposal("p-1").unwrap();
        proposal.phase = ProposalPhase::Voting;
        store.put_proposal(proposal);

        apply_vote_cast("p-1", &proposer, VoteChoice::For, 80, 10, &mut store).unwrap();
        let effects = apply_proposal_advance("p-1", 200, 100, &mut store).unwrap();
        assert!(effects.is_empty());
        assert_eq!(
            store.get_proposal("p-1").unwrap().phase,
            ProposalPhase::Queued
        );
    }

    #[test]
    fn delegation_cycle_is_rejected() {
        let mut store = MemStore::default();
        let a = did("did:claw:zA");
        let b = did("did:claw:zB");
        apply_delegate_set(&a, &b, None, 100, None, &mut store).unwrap();
        let err = apply_delegate_set(&b, &a, None, 100, None, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::DelegationCycle(_)));
    }

    #[test]
    fn delegation_percentage_above_100_is_rejected() {
        let mut store = MemStore::default();
        let a = did("did:claw:zA");
        let b = did("did:claw:zB");
        let err = apply_delegate_set(&a, &b, None, 101, None, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::SchemaInvalid(_)));
    }

    #[test]
    fn delegation_stores_scope_and_percentage() {
        let mut store = MemStore::default();
        let a = did("did:claw:zA");
        let b = did("did:claw:zB");
        apply_delegate_set(&a, &b, Some(ProposalType::TreasurySpend), 50, None, &mut store).unwrap();
        let delegation = store.get_delegation(&a).unwrap();
        assert_eq!(delegation.percentage, 50);
        assert!(delegation.covers(ProposalType::TreasurySpend, 0));
        assert!(!delegation.covers(ProposalType::Signal, 0));
    }

    #[test]
    fn timelock_execute_before_delay_is_rejected() {
        let mut store = MemStore::default();
        let mut proposal = base_proposal();
        proposal.phase = ProposalPhase::Queued;
        proposal.executable_at = Some(1_000);
        store.put_proposal(proposal);

        let err = apply_timelock_execute("p-1", 500, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::TimelockNotElapsed { .. }));

        let effects = apply_timelock_execute("p-1", 1_000, &mut store).unwrap();
        assert!(effects.is_empty());
        assert_eq!(
            store.get_proposal("p-1").unwrap().phase,
            ProposalPhase::Executed
        );
    }
}
