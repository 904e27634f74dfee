use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Did, Timestamp};
use clawnet_wallet::types::{Escrow, EscrowStatus};

use crate::effects::ContractsEffect;
use crate::events::ContractsEvent;
use crate::store::ContractsStore;
use crate::types::{Contract, ContractStatus, MilestoneStatus};

/// Apply a parsed `ContractsEvent` on `contract_id`, issued by `issuer` at
/// time `now`. `escrow` is the current state of the contract's linked
/// escrow as seen by the wallet reducer — looked up by the engine and
/// passed in so this crate never depends on wallet storage directly.
pub fn apply(
    event: &ContractsEvent,
    contract_id: &str,
    issuer: &Did,
    now: Timestamp,
    escrow: Option<&Escrow>,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    match event {
        ContractsEvent::Create { contract } => apply_create(contract, now, store),
        ContractsEvent::Sign => apply_sign(contract_id, issuer, now, store),
        ContractsEvent::Activate => apply_activate(contract_id, escrow, now, store),
        ContractsEvent::MilestoneSubmit { milestone_id } => {
            apply_milestone_submit(contract_id, milestone_id, issuer, now, store)
        }
        ContractsEvent::MilestoneApprove { milestone_id } => {
            apply_milestone_approve(contract_id, milestone_id, issuer, now, store)
        }
        ContractsEvent::MilestoneReject { milestone_id } => {
            apply_milestone_reject(contract_id, milestone_id, issuer, now, store)
        }
        ContractsEvent::DisputeOpen => apply_dispute_open(contract_id, issuer, now, store),
        ContractsEvent::DisputeResolve {
            provider_amount,
            client_amount,
        } => apply_dispute_resolve(contract_id, issuer, *provider_amount, *client_amount, store),
        ContractsEvent::SettlementExecute { counter_signer } => {
            apply_settlement_execute(contract_id, issuer, counter_signer, store)
        }
        ContractsEvent::Terminate => apply_terminate(contract_id, issuer, now, store),
    }
}

fn apply_create(
    contract: &Contract,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    if store.get_contract(&contract.id).is_some() {
        return Err(ClawNetError::SchemaInvalid(format!(
            "contract {} already exists",
            contract.id
        )));
    }
    let mut contract = contract.clone();
    contract.status = ContractStatus::Draft;
    contract.signatures.clear();
    contract.created_at = now;
    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

fn apply_sign(
    contract_id: &str,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if !contract.is_party(issuer) {
        return Err(ClawNetError::NotAContractParty(issuer.to_string()));
    }
    if contract.signatures.contains(issuer) {
        return Err(ClawNetError::AlreadySigned(issuer.to_string()));
    }
    if !matches!(
        contract.status,
        ContractStatus::Draft | ContractStatus::PendingSignature
    ) {
        return Err(ClawNetError::ContractNotActive);
    }

    contract.signatures.push(issuer.clone());
    if contract.status == ContractStatus::Draft {
        contract.status = ContractStatus::PendingSignature;
    }
    if contract.fully_signed() {
        contract.status = ContractStatus::PendingFunding;
    }
    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

fn apply_activate(
    contract_id: &str,
    escrow: Option<&Escrow>,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if contract.status != ContractStatus::PendingFunding {
        return Err(ClawNetError::ContractNotActive);
    }
    if !contract.fully_signed() {
        return Err(ClawNetError::ContractNotSigned);
    }
    if contract.escrow_required {
        let escrow = escrow.ok_or_else(|| {
            ClawNetError::EscrowNotFound(contract.escrow_id.clone().unwrap_or_default())
        })?;
        if escrow.status != EscrowStatus::Funded {
            return Err(ClawNetError::EscrowNotFunded);
        }
        if escrow.beneficiary != clawnet_core::types::Address::from_did(&contract.provider)
            .map_err(|_| ClawNetError::SchemaInvalid("provider has no derivable address".into()))?
        {
            return Err(ClawNetError::SchemaInvalid(
                "escrow beneficiary does not match contract provider".into(),
            ));
        }
        if escrow.current_balance() < contract.total {
            return Err(ClawNetError::EscrowNotFunded);
        }
    }

    contract.status = ContractStatus::Active;
    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

fn apply_milestone_submit(
    contract_id: &str,
    milestone_id: &str,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if contract.status != ContractStatus::Active {
        return Err(ClawNetError::ContractNotActive);
    }
    if &contract.provider != issuer {
        return Err(ClawNetError::NotAContractParty(issuer.to_string()));
    }
    if !contract.milestone_is_next(milestone_id) {
        return Err(ClawNetError::MilestoneOutOfSequence(
            milestone_id.to_string(),
        ));
    }

    let milestone = contract
        .milestone_mut(milestone_id)
        .ok_or_else(|| ClawNetError::MilestoneNotFound(milestone_id.to_string()))?;
    if milestone.status != MilestoneStatus::Pending
        && milestone.status != MilestoneStatus::Rejected
    {
        return Err(ClawNetError::MilestoneAlreadyApproved);
    }
    milestone.status = MilestoneStatus::Submitted;
    milestone.submitted_at = Some(now);

    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

fn apply_milestone_approve(
    contract_id: &str,
    milestone_id: &str,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if contract.status != ContractStatus::Active {
        return Err(ClawNetError::ContractNotActive);
    }
    if &contract.client != issuer {
        return Err(ClawNetError::NotAContractParty(issuer.to_string()));
    }

    let (amount, escrow_id) = {
        let milestone = contract
            .milestone_mut(milestone_id)
            .ok_or_else(|| ClawNetError::MilestoneNotFound(milestone_id.to_string()))?;
        if milestone.status != MilestoneStatus::Submitted {
            return Err(ClawNetError::MilestoneNotSubmitted);
        }
        milestone.status = MilestoneStatus::Approved;
        milestone.approved_at = Some(now);
        (milestone.amount, contract.escrow_id.clone())
    };

    let provider = contract.provider.clone();
    let mut effects = Vec::new();
    if let Some(escrow_id) = escrow_id {
        effects.push(ContractsEffect::ReleaseEscrow {
            escrow_id,
            amount,
            beneficiary: provider,
        });
    }

    if contract.all_milestones_resolved() {
        contract.status = ContractStatus::Completed;
    }
    contract.updated_at = now;
    store.put_contract(contract);
    Ok(effects)
}

fn apply_milestone_reject(
    contract_id: &str,
    milestone_id: &str,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if &contract.client != issuer {
        return Err(ClawNetError::NotAContractParty(issuer.to_string()));
    }
    let milestone = contract
        .milestone_mut(milestone_id)
        .ok_or_else(|| ClawNetError::MilestoneNotFound(milestone_id.to_string()))?;
    if milestone.status != MilestoneStatus::Submitted {
        return Err(ClawNetError::MilestoneNotSubmitted);
    }
    milestone.status = MilestoneStatus::Pending;
    milestone.submitted_at = None;

    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

fn apply_dispute_open(
    contract_id: &str,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    let eligible = contract.is_party(issuer) || contract.arbiter.as_ref() == Some(issuer);
    if !eligible {
        return Err(ClawNetError::NotDisputeEligible);
    }
    if contract.status == ContractStatus::Disputed {
        return Err(ClawNetError::ContractDisputeAlreadyOpen);
    }
    if contract.status != ContractStatus::Active {
        return Err(ClawNetError::ContractNotActive);
    }
    contract.status = ContractStatus::Disputed;
    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

fn apply_dispute_resolve(
    contract_id: &str,
    issuer: &Did,
    provider_amount: clawnet_core::types::Balance,
    client_amount: clawnet_core::types::Balance,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if contract.status != ContractStatus::Disputed {
        return Err(ClawNetError::ContractNotActive);
    }
    if contract.arbiter.as_ref() != Some(issuer) {
        return Err(ClawNetError::NotDisputeEligible);
    }

    let mut effects = Vec::new();
    if let Some(escrow_id) = contract.escrow_id.clone() {
        effects.push(ContractsEffect::SplitEscrow {
            escrow_id,
            provider_amount,
            client_amount,
            provider: contract.provider.clone(),
            client: contract.client.clone(),
        });
    }
    contract.status = ContractStatus::Terminated;
    store.put_contract(contract);
    Ok(effects)
}

fn apply_settlement_execute(
    contract_id: &str,
    issuer: &Did,
    counter_signer: &Did,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if contract.status != ContractStatus::Disputed {
        return Err(ClawNetError::ContractNotActive);
    }
    let parties = [&contract.client, &contract.provider];
    if !parties.contains(&issuer) || !parties.contains(&counter_signer) || issuer == counter_signer
    {
        return Err(ClawNetError::NotDisputeEligible);
    }

    let mut effects = Vec::new();
    if let Some(escrow_id) = contract.escrow_id.clone() {
        effects.push(ContractsEffect::SplitEscrow {
            escrow_id,
            provider_amount: contract.total,
            client_amount: 0,
            provider: contract.provider.clone(),
            client: contract.client.clone(),
        });
    }
    contract.status = ContractStatus::Completed;
    store.put_contract(contract);
    Ok(effects)
}

fn apply_terminate(
    contract_id: &str,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl ContractsStore,
) -> Result<Vec<ContractsEffect>, ClawNetError> {
    let mut contract = store
        .get_contract(contract_id)
        .ok_or_else(|| ClawNetError::ContractNotFound(contract_id.to_string()))?;

    if !contract.is_party(issuer) {
        return Err(ClawNetError::NotAContractParty(issuer.to_string()));
    }
    if !matches!(
        contract.status,
        ContractStatus::Draft | ContractStatus::PendingSignature | ContractStatus::PendingFunding
    ) {
        return Err(ClawNetError::ContractNotActive);
    }
    contract.status = ContractStatus::Terminated;
    contract.updated_at = now;
    store.put_contract(contract);
    Ok(vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Milestone;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        contracts: HashMap<String, Contract>,
    }

    impl ContractsStore for MemStore {
        fn get_contract(&self, id: &str) -> Option<Contract> {
            self.contracts.get(id).cloned()
        }
        fn put_contract(&mut self, contract: Contract) {
            self.contracts.insert(contract.id.clone(), contract);
        }
    }

    fn did(s: &str) -> Did {
        Did(s.to_string())
    }

    fn base_contract() -> Contract {
        Contract {
            id: "c-1".into(),
            client: did("did:claw:zClient"),
            provider: did("did:claw:zProvider"),
            other_parties: vec![],
            total: 100,
            escrow_required: false,
            escrow_id: None,
            arbiter: Some(did("did:claw:zArbiter")),
            status: ContractStatus::Draft,
            milestones: vec![Milestone {
                id: "m-1".into(),
                sequence: 0,
                description: "design".into(),
                amount: 100,
                status: MilestoneStatus::Pending,
                submitted_at: None,
                approved_at: None,
            }],
            signatures: vec![],
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn signing_advances_to_pending_funding_then_activate_without_escrow() {
        let mut store = MemStore::default();
        apply_create(&base_contract(), 0, &mut store).unwrap();

        apply_sign("c-1", &did("did:claw:zClient"), 1, &mut store).unwrap();
        assert_eq!(
            store.get_contract("c-1").unwrap().status,
            ContractStatus::PendingSignature
        );

        apply_sign("c-1", &did("did:claw:zProvider"), 2, &mut store).unwrap();
        assert_eq!(
            store.get_contract("c-1").unwrap().status,
            ContractStatus::PendingFunding
        );

        apply_activate("c-1", None, 3, &mut store).unwrap();
        assert_eq!(
            store.get_contract("c-1").unwrap().status,
            ContractStatus::Active
        );
    }

    #[test]
    fn milestone_approval_releases_escrow_and_completes_contract() {
        let mut store = MemStore::default();
        let mut contract = base_contract();
        contract.status = ContractStatus::Active;
        contract.escrow_id = Some("escrow-1".into());
        contract.signatures = vec![contract.client.clone(), contract.provider.clone()];
        store.put_contract(contract);

        apply_milestone_submit("c-1", "m-1", &did("did:claw:zProvider"), 5, &mut store).unwrap();
        let effects =
            apply_milestone_approve("c-1", "m-1", &did("did:claw:zClient"), 6, &mut store)
                .unwrap();

        assert!(matches!(
            effects.as_slice(),
            [ContractsEffect::ReleaseEscrow { amount: 100, .. }]
        ));
        assert_eq!(
            store.get_contract("c-1").unwrap().status,
            ContractStatus::Completed
        );
    }

    #[test]
    fn dispute_resolve_requires_arbiter() {
        let mut store = MemStore::default();
        let mut contract = base_contract();
        contract.status = ContractStatus::Disputed;
        contract.escrow_id = Some("escrow-1".into());
        store.put_contract(contract);

        let err = apply_dispute_resolve("c-1", &did("did:claw:zClient"), 60, 40, &mut store)
            .unwrap_err();
        assert!(matches!(err, ClawNetError::NotDisputeEligible));

        let effects =
            apply_dispute_resolve("c-1", &did("did:claw:zArbiter"), 60, 40, &mut store).unwrap();
        assert!(matches!(
            effects.as_slice(),
            [ContractsEffect::SplitEscrow {
                provider_amount: 60,
                client_amount: 40,
                ..
            }]
        ));
    }
}
