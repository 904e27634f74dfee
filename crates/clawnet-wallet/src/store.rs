use clawnet_core::types::Address;

use crate::types::{Escrow, WalletAccount};

/// Storage seam between this reducer and the engine's durable state.
pub trait WalletStore {
    fn get_account(&self, address: &Address) -> WalletAccount;
    fn put_account(&mut self, address: &Address, account: WalletAccount);

    fn get_escrow(&self, escrow_id: &str) -> Option<Escrow>;
    fn put_escrow(&mut self, escrow: Escrow);
}
