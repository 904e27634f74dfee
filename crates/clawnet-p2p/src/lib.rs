//! clawnet-p2p
//!
//! libp2p networking layer for ClawNet nodes.
//!
//! GossipSub broadcasts signed event envelopes on a topic per event
//! family, plus two control topics for range-sync and snapshot transfer.
//! Kademlia DHT handles peer discovery and bootstrap. Identify and Ping
//! maintain connection metadata and liveness.

pub mod config;
pub mod message;
pub mod network;

pub use config::{topic_for_family, P2pConfig, EVENT_FAMILIES, SNAPSHOT_TOPIC, SYNC_TOPIC};
pub use message::{ContentType, P2pEnvelope, RangeSyncRequest, RangeSyncResponse, SnapshotChunk};
pub use network::{P2pHandle, P2pNetwork};
