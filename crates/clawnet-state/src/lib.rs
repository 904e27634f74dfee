pub mod buffer;
pub mod db;
pub mod engine;
pub mod resource;

pub use buffer::{IngestOutcome, OutOfOrderBuffer};
pub use db::StateDb;
pub use engine::StateEngine;
pub use resource::{contract_id_of, proposal_id_of, resource_id_for};
