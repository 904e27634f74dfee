use clawnet_core::constants::TREASURY_ADDRESS;
use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Address, Balance, Timestamp};

use crate::events::WalletEvent;
use crate::rules::{condition_met, ConditionContext};
use crate::store::WalletStore;
use crate::types::{Escrow, EscrowStatus};

/// Apply a parsed `WalletEvent` issued from `from` at time `now`.
///
/// `milestone_approved` lets a `Milestone` release rule be checked without
/// this crate depending on `clawnet-contracts`; the engine wires the real
/// lookup in when it dispatches to this reducer.
pub fn apply(
    event: &WalletEvent,
    from: &Address,
    now: Timestamp,
    milestone_approved: &dyn Fn(&str, &str) -> bool,
    store: &mut impl WalletStore,
) -> Result<(), ClawNetError> {
    match event {
        WalletEvent::Transfer { to, amount, fee } => apply_transfer(from, to, *amount, *fee, store),
        WalletEvent::EscrowCreate {
            escrow_id,
            beneficiary,
            rule,
            arbiter,
            expires_at,
        } => apply_escrow_create(
            escrow_id,
            from,
            beneficiary,
            rule.clone(),
            arbiter.clone(),
            *expires_at,
            now,
            store,
        ),
        WalletEvent::EscrowFund { escrow_id, amount } => {
            apply_escrow_fund(escrow_id, from, *amount, store)
        }
        WalletEvent::EscrowRelease {
            escrow_id,
            amount,
            provided_signers,
        } => apply_escrow_release(
            escrow_id,
            *amount,
            now,
            milestone_approved,
            provided_signers,
            store,
        ),
        WalletEvent::EscrowRefund { escrow_id, amount } => {
            apply_escrow_refund(escrow_id, *amount, store)
        }
    }
}

fn apply_transfer(
    from: &Address,
    to: &Address,
    amount: Balance,
    fee: Balance,
    store: &mut impl WalletStore,
) -> Result<(), ClawNetError> {
    if amount == 0 {
        return Err(ClawNetError::ZeroAmount);
    }
    if from == to {
        return Err(ClawNetError::SelfTransfer);
    }

    let mut sender = store.get_account(from);
    let total_debit = amount + fee;
    if sender.available < total_debit {
        return Err(ClawNetError::InsufficientBalance {
            need: total_debit,
            have: sender.available,
        });
    }
    sender.available -= total_debit;

    let mut recipient = store.get_account(to);
    recipient.available += amount;

    store.put_account(from, sender);
    store.put_account(to, recipient);

    if fee > 0 {
        let treasury_address = Address(TREASURY_ADDRESS.to_string());
        let mut treasury = store.get_account(&treasury_address);
        treasury.available += fee;
        store.put_account(&treasury_address, treasury);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn apply_escrow_create(
    escrow_id: &str,
    depositor: &Address,
    beneficiary: &Address,
    rule: crate::rules::ReleaseRule,
    arbiter: Option<clawnet_core::types::Did>,
    expires_at: Option<Timestamp>,
    now: Timestamp,
    store: &mut impl WalletStore,
) -> Result<(), ClawNetError> {
    if store.get_escrow(escrow_id).is_some() {
        return Err(ClawNetError::SchemaInvalid(format!(
            "escrow {escrow_id} already exists"
        )));
    }
    let escrow = Escrow {
        id: escrow_id.to_string(),
        depositor: depositor.clone(),
        beneficiary: beneficiary.clone(),
        funded: 0,
        released: 0,
        refunded: 0,
        rule,
        arbiter,
        status: EscrowStatus::Pending,
        created_at: now,
        expires_at,
    };
    store.put_escrow(escrow);
    Ok(())
}

fn apply_escrow_fund(
    escrow_id: &str,
    depositor: &Address,
    amount: Balance,
    store: &mut impl WalletStore,
) -> Result<(), ClawNetError> {
    let mut escrow = store
        .get_escrow(escrow_id)
        .ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;

    if escrow.status != EscrowStatus::Pending && escrow.status != EscrowStatus::Funded {
        return Err(ClawNetError::SchemaInvalid(format!(
            "escrow {escrow_id} is not in a fundable state"
        )));
    }
    if &escrow.depositor != depositor {
        return Err(ClawNetError::SchemaInvalid(
            "only the escrow's depositor may fund it".into(),
        ));
    }

    let mut depositor_account = store.get_account(depositor);
    if depositor_account.available < amount {
        return Err(ClawNetError::InsufficientBalance {
            need: amount,
            have: depositor_account.available,
        });
    }
    depositor_account.available -= amount;
    depositor_account.locked_escrow += amount;
    store.put_account(depositor, depositor_account);

    escrow.funded += amount;
    escrow.status = EscrowStatus::Funded;
    store.put_escrow(escrow);
    Ok(())
}

fn apply_escrow_release(
    escrow_id: &str,
    amount: Balance,
    now: Timestamp,
    milestone_approved: &dyn Fn(&str, &str) -> bool,
    provided_signers: &[clawnet_core::types::Did],
    store: &mut impl WalletStore,
) -> Result<(), ClawNetError> {
    let mut escrow = store
        .get_escrow(escrow_id)
        .ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;

    if escrow.status != EscrowStatus::Funded && escrow.status != EscrowStatus::Disputed {
        return Err(ClawNetError::EscrowNotFunded);
    }
    if amount > escrow.current_balance() {
        return Err(ClawNetError::InsufficientBalance {
            need: amount,
            have: escrow.current_balance(),
        });
    }

    if escrow.status == EscrowStatus::Funded {
        let ctx = ConditionContext {
            now,
            milestone_approved,
            provided_signers,
        };
        if !condition_met(&escrow.rule, &ctx) {
            return Err(ClawNetError::EscrowReleaseConditionUnmet);
        }
    }
    // A `Disputed` escrow being released this way is the arbiter's direct
    // resolution path (§4.3) and bypasses `rule` entirely — the contracts
    // reducer is responsible for only allowing the arbiter DID to submit
    // this event while disputed.

    let mut depositor_account = store.get_account(&escrow.depositor);
    depositor_account.locked_escrow -= amount;
    store.put_account(&escrow.depositor, depositor_account);

    let mut beneficiary_account = store.get_account(&escrow.beneficiary);
    beneficiary_account.available += amount;
    store.put_account(&escrow.beneficiary, beneficiary_account);

    escrow.released += amount;
    escrow.status = if escrow.current_balance() == 0 {
        EscrowStatus::Released
    } else {
        EscrowStatus::Releasing
    };
    store.put_escrow(escrow);
    Ok(())
}

fn apply_escrow_refund(
    escrow_id: &str,
    amount: Balance,
    store: &mut impl WalletStore,
) -> Result<(), ClawNetError> {
    let mut escrow = store
        .get_escrow(escrow_id)
        .ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;

    if escrow.status != EscrowStatus::Funded
        && escrow.status != EscrowStatus::Disputed
        && escrow.status != EscrowStatus::Expired
    {
        return Err(ClawNetError::EscrowNotFunded);
    }
    if amount > escrow.current_balance() {
        return Err(ClawNetError::InsufficientBalance {
            need: amount,
            have: escrow.current_balance(),
        });
    }

    let mut depositor_account = store.get_account(&escrow.depositor);
    depositor_account.locked_escrow -= amount;
    depositor_account.available += amount;
    store.put_account(&escrow.depositor, depositor_account);

    escrow.refunded += amount;
    escrow.status = if escrow.current_balance() == 0 {
        EscrowStatus::Refunded
    } else {
        EscrowStatus::Refunding
    };
    store.put_escrow(escrow);
    Ok(())
}

// ── Supplemented: cross-subsystem escrow lifecycle hooks ─────────────────────
//
// `dispute.open` (markets/contracts) and the expiry sweep (§9: "scheduled
// effects are driven by a sweep function called with the current time") are
// not wallet-originated events — the contracts/markets reducers and the
// engine's sweep call these directly through the same `WalletStore` seam.

pub fn mark_disputed(escrow_id: &str, store: &mut impl WalletStore) -> Result<(), ClawNetError> {
    let mut escrow = store
        .get_escrow(escrow_id)
        .ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;
    if escrow.status != EscrowStatus::Funded {
        return Err(ClawNetError::EscrowNotFunded);
    }
    escrow.status = EscrowStatus::Disputed;
    store.put_escrow(escrow);
    Ok(())
}

pub fn sweep_expired(now: Timestamp, escrow_id: &str, store: &mut impl WalletStore) -> Result<(), ClawNetError> {
    let mut escrow = store
        .get_escrow(escrow_id)
        .ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;
    if escrow.status == EscrowStatus::Funded {
        if let Some(expires_at) = escrow.expires_at {
            if now > expires_at {
                escrow.status = EscrowStatus::Expired;
                store.put_escrow(escrow);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ReleaseRule;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        accounts: HashMap<String, crate::types::WalletAccount>,
        escrows: HashMap<String, Escrow>,
    }

    impl WalletStore for MemStore {
        fn get_account(&self, address: &Address) -> crate::types::WalletAccount {
            self.accounts.get(&address.0).cloned().unwrap_or_default()
        }
        fn put_account(&mut self, address: &Address, account: crate::types::WalletAccount) {
            self.accounts.insert(address.0.clone(), account);
        }
        fn get_escrow(&self, escrow_id: &str) -> Option<Escrow> {
            self.escrows.get(escrow_id).cloned()
        }
        fn put_escrow(&mut self, escrow: Escrow) {
            self.escrows.insert(escrow.id.clone(), escrow);
        }
    }

    fn addr(s: &str) -> Address {
        Address(s.to_string())
    }

    #[test]
    fn transfer_with_fee_matches_scenario_one() {
        let mut store = MemStore::default();
        let sender = addr("clawS");
        let recipient = addr("clawR");
        store.put_account(
            &sender,
            crate::types::WalletAccount {
                available: 100,
                ..Default::default()
            },
        );

        apply_transfer(&sender, &recipient, 30, 1, &mut store).unwrap();

        assert_eq!(store.get_account(&sender).available, 69);
        assert_eq!(store.get_account(&recipient).available, 30);
        let treasury = store.get_account(&Address(TREASURY_ADDRESS.to_string()));
        assert_eq!(treasury.available, 1);
    }

    #[test]
    fn transfer_rejects_insufficient_balance() {
        let mut store = MemStore::default();
        let sender = addr("clawS");
        let recipient = addr("clawR");
        let err = apply_transfer(&sender, &recipient, 30, 1, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::InsufficientBalance { .. }));
    }

    #[test]
    fn escrow_full_lifecycle_create_fund_release() {
        let mut store = MemStore::default();
        let depositor = addr("clawC");
        let beneficiary = addr("clawP");
        store.put_account(
            &depositor,
            crate::types::WalletAccount {
                available: 100,
                ..Default::default()
            },
        );

        apply_escrow_create(
            "escrow-1",
            &depositor,
            &beneficiary,
            ReleaseRule::Manual,
            None,
            None,
            0,
            &mut store,
        )
        .unwrap();
        apply_escrow_fund("escrow-1", &depositor, 100, &mut store).unwrap();
        assert_eq!(store.get_account(&depositor).locked_escrow, 100);

        let milestone_approved = |_: &str, _: &str| false;
        apply_escrow_release("escrow-1", 100, 10, &milestone_approved, &[], &mut store).unwrap();

        assert_eq!(store.get_account(&depositor).locked_escrow, 0);
        assert_eq!(store.get_account(&beneficiary).available, 100);
        assert_eq!(store.get_escrow("escrow-1").unwrap().status, EscrowStatus::Released);
    }
}
