use clawnet_core::types::{Balance, Did};

/// A side effect the markets reducer needs another reducer to carry out in
/// the same staged-mutation step (§4.1 "staged commit"). The engine applies
/// these after the markets mutation itself has been staged successfully, so
/// that either the whole group commits or none of it does.
#[derive(Clone, Debug)]
pub enum MarketsEffect {
    /// Accepting a task bid creates a contract before the order that
    /// references it (§4.4) — ids are derived from the accepting
    /// envelope's hash so two independent replays agree on them.
    CreateContractForBid {
        contract_id: String,
        order_id: String,
        listing_id: String,
        client: Did,
        provider: Did,
        total: Balance,
    },
    /// Pay-per-use capability billing (§4.4) emits a transfer in the same
    /// reducer step as the usage record.
    EmitWalletTransfer {
        from: Did,
        to: Did,
        amount: Balance,
    },
    /// A completed order's review emits a reputation record (§4.4).
    EmitReputationRecord {
        target: Did,
        dimension: String,
        score: u16,
        reference: String,
    },
}
