use clawnet_core::types::{Balance, Did};

/// A side effect the contracts reducer needs the wallet reducer to carry
/// out in the same staged-mutation step (§4.5).
#[derive(Clone, Debug)]
pub enum ContractsEffect {
    /// A milestone approval with an attached payment rule releases that
    /// milestone's amount from escrow to the provider.
    ReleaseEscrow {
        escrow_id: String,
        amount: Balance,
        beneficiary: Did,
    },
    /// A dispute resolution or mutual settlement drains the remaining
    /// escrow per the agreed split.
    SplitEscrow {
        escrow_id: String,
        provider_amount: Balance,
        client_amount: Balance,
        provider: Did,
        client: Did,
    },
}
