pub mod constants;
pub mod effects;
pub mod events;
pub mod power;
pub mod query;
pub mod reducer;
pub mod store;
pub mod types;

pub use effects::DaoEffect;
pub use events::{parse_payload, DaoEvent};
pub use power::{base_power, effective_power};
pub use query::{DaoQuery, Tally};
pub use reducer::apply;
pub use store::DaoStore;
pub use types::{
    Delegation, Proposal, ProposalAction, ProposalPhase, ProposalType, Vote, VoteChoice,
    VotingInputs,
};
