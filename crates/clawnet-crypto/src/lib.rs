pub mod ed25519;
pub mod hash;
pub mod keypair;
pub mod x25519;

pub use ed25519::{verify_signature, ClawNetSigner};
pub use hash::{address_from_pubkey, blake3_hash, did_from_pubkey, envelope_hash};
pub use keypair::KeyPair;
pub use x25519::AgreementKeyPair;
