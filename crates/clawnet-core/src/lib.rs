pub mod constants;
pub mod envelope;
pub mod error;
pub mod types;

pub use constants::*;
pub use envelope::{canonical_json_bytes, type_family, Envelope};
pub use error::ClawNetError;
pub use types::*;
