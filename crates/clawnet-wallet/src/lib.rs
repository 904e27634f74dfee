pub mod events;
pub mod query;
pub mod reducer;
pub mod rules;
pub mod store;
pub mod types;

pub use events::{parse_payload, WalletEvent};
pub use query::WalletQuery;
pub use reducer::{apply, mark_disputed, sweep_expired};
pub use rules::{condition_met, BoolOp, ConditionContext, ReleaseRule};
pub use store::WalletStore;
pub use types::{Escrow, EscrowStatus, WalletAccount};
