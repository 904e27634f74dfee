use clawnet_core::types::{Address, Timestamp};

use crate::rules::{condition_met, ConditionContext};
use crate::store::WalletStore;
use crate::types::{Escrow, WalletAccount};

/// Read-side view over wallet state.
pub struct WalletQuery<'a, S: WalletStore> {
    store: &'a S,
}

impl<'a, S: WalletStore> WalletQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn balance(&self, address: &Address) -> WalletAccount {
        self.store.get_account(address)
    }

    pub fn escrow(&self, escrow_id: &str) -> Option<Escrow> {
        self.store.get_escrow(escrow_id)
    }

    /// Whether an escrow's release rule is currently satisfied, without
    /// submitting a release event to find out.
    pub fn release_ready(
        &self,
        escrow_id: &str,
        now: Timestamp,
        milestone_approved: &dyn Fn(&str, &str) -> bool,
        provided_signers: &[clawnet_core::types::Did],
    ) -> Option<bool> {
        let escrow = self.store.get_escrow(escrow_id)?;
        let ctx = ConditionContext {
            now,
            milestone_approved,
            provided_signers,
        };
        Some(condition_met(&escrow.rule, &ctx))
    }
}
