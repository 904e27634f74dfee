//! End-to-end smoke test for the node's embedded pipeline.
//!
//! There is no RPC surface on this build, so this drives the same
//! components `main.rs` wires together — `StateDb`, `apply_genesis`,
//! `StateEngine` — directly, rather than spawning a node process and
//! talking to it over a network socket.

use clawnet_core::constants::ENVELOPE_VERSION;
use clawnet_core::envelope::Envelope;
use clawnet_core::types::{Address, Balance, Did, Hash32};
use clawnet_crypto::KeyPair;
use clawnet_genesis::{apply_genesis, GenesisParams, SeedAccount};
use clawnet_identity::DidDocument;
use clawnet_state::StateDb;
use clawnet_state::StateEngine;

fn now_ms() -> i64 {
    1_700_000_000_000
}

fn sign_envelope(
    kp: &KeyPair,
    event_type: &str,
    nonce: u64,
    resource_prev: Option<Hash32>,
    payload: serde_json::Value,
) -> Envelope {
    let mut envelope = Envelope {
        v: ENVELOPE_VERSION,
        event_type: event_type.to_string(),
        issuer: kp.did.clone(),
        ts: now_ms(),
        nonce,
        resource_prev,
        payload,
        hash: Hash32::from_bytes([0u8; 32]),
        sig: clawnet_core::types::Ed25519Signature([0u8; 64]),
    };
    let bytes = envelope.signing_bytes().expect("signing bytes");
    envelope.hash = Hash32::of(&bytes);
    envelope.sig = kp.sign(&bytes);
    envelope
}

fn identity_create_envelope(kp: &KeyPair) -> Envelope {
    let document = DidDocument {
        did: kp.did.clone(),
        auth_key: kp.public_key,
        agreement_key: None,
        platforms: Vec::new(),
        capabilities: Vec::new(),
        prev_doc_hash: None,
        created_at: now_ms(),
        updated_at: now_ms(),
    };
    let payload = serde_json::json!({ "document": document });
    sign_envelope(kp, "identity.create", 1, None, payload)
}

fn transfer_envelope(kp: &KeyPair, nonce: u64, to: &Address, amount: Balance) -> Envelope {
    let payload = serde_json::json!({
        "to": to.as_str(),
        "amount": amount.to_string(),
    });
    sign_envelope(kp, "wallet.transfer", nonce, None, payload)
}

#[test]
fn genesis_then_transfer_updates_balances() {
    let dir = std::env::temp_dir().join(format!("clawnet_node_smoke_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let db = StateDb::open(&dir).expect("open state db");

    let alice = KeyPair::generate();
    let bob = KeyPair::generate();

    let params = GenesisParams {
        treasury_initial_balance: 1_000_000,
        seed_accounts: vec![SeedAccount {
            did: Did(alice.did.0.clone()),
            initial_balance: 10_000,
        }],
    };
    apply_genesis(&db, &params).expect("genesis must succeed");

    let mut engine = StateEngine::new(db);

    // Alice must publish her DID document before she can sign further
    // envelopes that get checked against a stored auth key.
    engine
        .validate_and_apply(&identity_create_envelope(&alice), now_ms())
        .expect("identity.create must succeed");

    let bob_address = Address::from_did(&bob.did).expect("derive bob's address");
    engine
        .validate_and_apply(&transfer_envelope(&alice, 1, &bob_address, 2_500), now_ms())
        .expect("wallet.transfer must succeed");

    let alice_address = Address::from_did(&alice.did).expect("derive alice's address");
    let alice_account = engine
        .db()
        .get_wallet_account(&alice_address)
        .expect("read alice's account")
        .expect("alice has an account after genesis");
    let bob_account = engine
        .db()
        .get_wallet_account(&bob_address)
        .expect("read bob's account")
        .expect("bob has an account after the transfer");

    assert_eq!(bob_account.available, 2_500, "bob should have received the transfer");
    assert!(
        alice_account.available < 10_000,
        "alice's balance should be reduced by the transfer and fee"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn resubmitting_an_applied_envelope_is_a_no_op() {
    let dir = std::env::temp_dir().join(format!("clawnet_node_smoke_dup_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let db = StateDb::open(&dir).expect("open state db");
    apply_genesis(
        &db,
        &GenesisParams { treasury_initial_balance: 1, seed_accounts: Vec::new() },
    )
    .expect("genesis must succeed");

    let mut engine = StateEngine::new(db);
    let alice = KeyPair::generate();
    let envelope = identity_create_envelope(&alice);

    engine.validate_and_apply(&envelope, now_ms()).expect("first application succeeds");
    engine
        .validate_and_apply(&envelope, now_ms())
        .expect("re-delivery of an already-applied envelope is a no-op, not an error");

    let _ = std::fs::remove_dir_all(&dir);
}
