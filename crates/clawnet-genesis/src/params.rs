use clawnet_core::types::{Balance, Did};
use serde::{Deserialize, Serialize};

/// One pre-funded address seeded directly at genesis, outside the normal
/// `wallet.transfer` envelope pipeline (e.g. a faucet or founding
/// operator account).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedAccount {
    pub did: Did,
    pub initial_balance: Balance,
}

/// Genesis parameters for a fresh ClawNet deployment.
///
/// In production these come from a launch configuration agreed on by the
/// deploying operators; in tests, arbitrary values are used.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisParams {
    /// Starting balance credited to the DAO treasury address
    /// (`clawnet_core::constants::TREASURY_DID`) — the protocol-reserve-style
    /// initial distribution the DAO's `deposits − spends == currentBalance`
    /// invariant needs a starting point for.
    pub treasury_initial_balance: Balance,
    /// Any additional pre-funded accounts.
    pub seed_accounts: Vec<SeedAccount>,
}

impl GenesisParams {
    /// Total value this genesis configuration will bring into existence —
    /// the protocol's entire initial supply.
    pub fn total_supply(&self) -> Balance {
        self.seed_accounts.iter().map(|s| s.initial_balance).sum::<Balance>() + self.treasury_initial_balance
    }
}
