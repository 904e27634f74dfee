pub mod effects;
pub mod events;
pub mod query;
pub mod reducer;
pub mod store;
pub mod types;

pub use effects::ContractsEffect;
pub use events::{parse_payload, ContractsEvent};
pub use query::{ContractsQuery, NextAction};
pub use reducer::apply;
pub use store::ContractsStore;
pub use types::{
    Contract, ContractParty, ContractStatus, Milestone, MilestoneStatus, PartyRole,
    contract_transition_allowed,
};
