pub mod document;
pub mod events;
pub mod query;
pub mod reducer;
pub mod store;

pub use document::{CapabilityCredential, DidDocument, IssuerCredential, PlatformLink};
pub use events::{parse_payload, IdentityEvent};
pub use query::{IdentityQuery, KeyStatus};
pub use reducer::apply;
pub use store::IdentityStore;
