//! clawnet-genesis
//!
//! Builds the ClawNet genesis state from scratch, writing directly into a
//! `StateDb` without going through the normal envelope pipeline — genesis
//! balances have no issuer, no nonce, and no signature, so there is no
//! envelope to validate against.
//!
//! Genesis credits the DAO treasury address with its starting balance and
//! any additional seed accounts named in `GenesisParams`. This is the one
//! and only place in the protocol where tokens are created; after genesis
//! runs, total supply only ever moves between accounts (§8 property 5),
//! it never grows.

pub mod params;

pub use params::{GenesisParams, SeedAccount};

use clawnet_core::constants::TREASURY_DID;
use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Address, Balance, Did};
use clawnet_state::StateDb;
use tracing::info;

/// The set of addresses genesis credited, for the caller to log or verify.
pub struct GenesisSummary {
    pub treasury_balance: Balance,
    pub seed_accounts: Vec<(Did, Balance)>,
}

/// Apply the genesis state to an empty `StateDb`.
///
/// # Errors
/// Returns `ClawNetError::GenesisAlreadyApplied` if the treasury already
/// carries a balance — genesis may only run once per store.
pub fn apply_genesis(db: &StateDb, params: &GenesisParams) -> Result<GenesisSummary, ClawNetError> {
    info!("applying ClawNet genesis state");

    if db.treasury_balance()? != 0 {
        return Err(ClawNetError::GenesisAlreadyApplied);
    }

    db.set_treasury_balance(params.treasury_initial_balance)?;
    info!(balance = params.treasury_initial_balance, did = TREASURY_DID, "genesis: treasury funded");

    let mut seed_accounts = Vec::with_capacity(params.seed_accounts.len());
    for seed in &params.seed_accounts {
        let address = Address::from_did(&seed.did)
            .map_err(|_| ClawNetError::SchemaInvalid(format!("seed account DID is not a valid did:claw DID: {}", seed.did)))?;
        let mut account = db.get_wallet_account(&address)?.unwrap_or_default();
        account.available += seed.initial_balance;
        db.put_wallet_account(&address, &account)?;
        info!(did = %seed.did, balance = seed.initial_balance, "genesis: seed account funded");
        seed_accounts.push((seed.did.clone(), seed.initial_balance));
    }

    verify_genesis_supply(db, params)?;

    db.flush()?;
    info!("genesis state committed to disk");

    Ok(GenesisSummary { treasury_balance: params.treasury_initial_balance, seed_accounts })
}

/// Verify that the treasury balance plus every seed account's balance sums
/// to exactly the genesis configuration's declared total supply.
fn verify_genesis_supply(db: &StateDb, params: &GenesisParams) -> Result<(), ClawNetError> {
    let treasury = db.treasury_balance()?;

    let mut seed_total: Balance = 0;
    for seed in &params.seed_accounts {
        let address = Address::from_did(&seed.did)
            .map_err(|_| ClawNetError::SchemaInvalid(format!("seed account DID is not a valid did:claw DID: {}", seed.did)))?;
        seed_total += db.get_wallet_account(&address)?.unwrap_or_default().available;
    }

    let total = treasury + seed_total;
    let expected = params.total_supply();
    if total != expected {
        return Err(ClawNetError::GenesisSupplyMismatch { expected, got: total });
    }

    info!(total_supply = total, "genesis supply verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawnet_core::types::Did;

    fn test_params() -> GenesisParams {
        GenesisParams {
            treasury_initial_balance: 1_000_000,
            seed_accounts: vec![
                SeedAccount { did: Did("did:claw:zFaucet1111111111111111111111111111111".into()), initial_balance: 500_000 },
                SeedAccount { did: Did("did:claw:zFaucet2222222222222222222222222222222".into()), initial_balance: 250_000 },
            ],
        }
    }

    #[test]
    fn genesis_supply_is_exact() {
        let dir = std::env::temp_dir().join(format!("clawnet_genesis_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let db = StateDb::open(&dir).unwrap();
        let params = test_params();

        let summary = apply_genesis(&db, &params).expect("genesis must succeed");
        assert_eq!(summary.treasury_balance, 1_000_000);
        assert_eq!(db.treasury_balance().unwrap(), 1_000_000);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn genesis_rejects_second_application() {
        let dir = std::env::temp_dir().join(format!("clawnet_genesis_test_twice_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let db = StateDb::open(&dir).unwrap();
        let params = test_params();

        apply_genesis(&db, &params).expect("first genesis must succeed");
        let result = apply_genesis(&db, &params);
        assert!(matches!(result, Err(ClawNetError::GenesisAlreadyApplied)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
