/// Event-type families that get their own gossipsub topic (§2A). Kept as a
/// fixed list rather than discovered dynamically — every family is known
/// up front from the envelope schema, so there is no reason to subscribe
/// lazily.
pub const EVENT_FAMILIES: [&str; 6] =
    ["identity", "wallet", "market", "contract", "reputation", "dao"];

/// Control topics alongside the per-family event topics.
pub const SYNC_TOPIC: &str = "clawnet-sync";
pub const SNAPSHOT_TOPIC: &str = "clawnet-snapshot";

/// Gossipsub topic name for a given envelope type-family, e.g.
/// `"identity"` → `"clawnet-identity"`.
pub fn topic_for_family(family: &str) -> String {
    format!("clawnet-{family}")
}

/// Configuration for the ClawNet P2P network.
#[derive(Debug, Clone)]
pub struct P2pConfig {
    /// Local listen address (e.g. "/ip4/0.0.0.0/tcp/7777").
    pub listen_addr: String,
    /// Bootstrap peer multiaddresses.
    pub bootstrap_peers: Vec<String>,
    /// Protocol version string advertised to peers.
    pub protocol_version: String,
}

impl P2pConfig {
    /// Every gossipsub topic this node subscribes to: one per event family
    /// plus the two control topics.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = EVENT_FAMILIES.iter().map(|f| topic_for_family(f)).collect();
        topics.push(SYNC_TOPIC.to_string());
        topics.push(SNAPSHOT_TOPIC.to_string());
        topics
    }
}

impl Default for P2pConfig {
    fn default() -> Self {
        Self {
            listen_addr: "/ip4/0.0.0.0/tcp/7777".into(),
            bootstrap_peers: Vec::new(),
            protocol_version: "/clawnet/1.0.0".into(),
        }
    }
}
