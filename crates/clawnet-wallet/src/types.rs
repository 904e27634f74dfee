use clawnet_core::types::{Address, Balance, Did, Timestamp};
use serde::{Deserialize, Serialize};

// ── Account ──────────────────────────────────────────────────────────────────

/// An address's full balance breakdown. All fields are non-negative by
/// construction — every mutation that would drive one below zero is
/// rejected before it is staged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalletAccount {
    pub available: Balance,
    pub pending: Balance,
    pub locked_escrow: Balance,
    pub locked_governance: Balance,
}

impl WalletAccount {
    pub fn total(&self) -> Balance {
        self.available + self.pending + self.locked_escrow + self.locked_governance
    }
}

// ── Escrow ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Pending,
    Funded,
    Releasing,
    Released,
    Refunding,
    Refunded,
    Disputed,
    Expired,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Escrow {
    pub id: String,
    pub depositor: Address,
    pub beneficiary: Address,

    /// Total amount ever funded into this escrow.
    pub funded: Balance,
    pub released: Balance,
    pub refunded: Balance,

    pub rule: crate::rules::ReleaseRule,

    /// DID entitled to resolve a dispute by direct release/refund, if any.
    pub arbiter: Option<Did>,

    pub status: EscrowStatus,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

impl Escrow {
    /// Invariant #6 (§8): `funded − released − refunded == currentBalance`.
    pub fn current_balance(&self) -> Balance {
        self.funded - self.released - self.refunded
    }
}
