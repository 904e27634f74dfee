//! clawnet-node — the ClawNet full-node binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the state database
//!   2. Apply genesis if the DB is fresh
//!   3. Start the P2P network (libp2p GossipSub + Kademlia)
//!   4. Run the main loop: validate inbound envelopes → apply → broadcast
//!
//! There is no RPC/HTTP API in this build — submitting envelopes locally
//! is out of scope beyond the one surface a node needs to participate in
//! gossip, so envelopes are read as newline-delimited canonical JSON on
//! stdin.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use clawnet_core::envelope::Envelope;
use clawnet_genesis::{apply_genesis, GenesisParams};
use clawnet_p2p::{topic_for_family, ContentType, P2pConfig, P2pEnvelope, P2pNetwork};
use clawnet_state::{IngestOutcome, OutOfOrderBuffer, StateDb, StateEngine};

#[derive(Parser, Debug)]
#[command(name = "clawnet-node", version, about = "ClawNet protocol node")]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.clawnet/data")]
    data_dir: PathBuf,

    /// P2P listen address.
    #[arg(long, default_value = "/ip4/0.0.0.0/tcp/7777")]
    p2p_listen: String,

    /// Bootstrap peer multiaddresses (comma-separated).
    #[arg(long, value_delimiter = ',')]
    bootstrap: Vec<String>,

    /// Path to genesis params JSON (only required on first run).
    #[arg(long)]
    genesis_params: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,clawnet=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("ClawNet node starting");

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let db = StateDb::open(&data_dir).context("opening state database")?;

    // ── Genesis if fresh ──────────────────────────────────────────────────────
    if db.treasury_balance().context("reading treasury balance")? == 0 {
        info!("fresh database — applying genesis");
        let params = load_or_generate_genesis_params(args.genesis_params.as_deref())?;
        apply_genesis(&db, &params).context("applying genesis")?;
    } else {
        info!("existing database found — skipping genesis");
    }

    // ── State engine, wrapped in the out-of-order buffer ─────────────────────
    let mut engine = StateEngine::new(db);
    let mut buffer = OutOfOrderBuffer::new();

    // ── P2P network ───────────────────────────────────────────────────────────
    let p2p_config = P2pConfig {
        listen_addr: args.p2p_listen.clone(),
        bootstrap_peers: args.bootstrap.clone(),
        ..P2pConfig::default()
    };
    let (p2p_network, mut p2p_handle) =
        P2pNetwork::new(&p2p_config).map_err(|e| anyhow::anyhow!("building P2P network: {e}"))?;
    info!(peer_id = %p2p_handle.local_peer_id, "P2P identity");

    let local_peer_id = p2p_handle.local_peer_id.to_string();
    let outbound_tx = p2p_handle.outbound_tx.clone();

    tokio::spawn(async move { p2p_network.run().await });

    /// One envelope waiting to be ingested, tagged with where it came from —
    /// only locally-submitted envelopes are re-broadcast on success, since
    /// anything received from gossip has already been propagated to the
    /// rest of the mesh by its original sender.
    enum Submission {
        Local(Envelope),
        Network(Envelope),
    }

    let (sub_tx, mut sub_rx) = tokio::sync::mpsc::channel::<Submission>(256);

    // Local envelopes arrive as newline-delimited canonical JSON on stdin.
    let stdin_tx = sub_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Envelope>(line) {
                        Ok(envelope) => {
                            if stdin_tx.send(Submission::Local(envelope)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "failed to parse envelope from stdin"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin read error");
                    break;
                }
            }
        }
    });

    // Gossip-received frames carrying event envelopes feed the same queue.
    let network_tx = sub_tx.clone();
    tokio::spawn(async move {
        while let Some(frame) = p2p_handle.inbound_rx.recv().await {
            if frame.content_type != ContentType::Event {
                continue;
            }
            match frame.decode_event() {
                Ok(envelope) => {
                    if network_tx.send(Submission::Network(envelope)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "failed to decode gossip envelope"),
            }
        }
    });
    drop(sub_tx);

    // ── Main loop: validate & apply ───────────────────────────────────────────
    info!("node ready");
    while let Some(submission) = sub_rx.recv().await {
        let (envelope, from_network) = match submission {
            Submission::Local(e) => (e, false),
            Submission::Network(e) => (e, true),
        };
        let now = chrono::Utc::now().timestamp();
        let event_type = envelope.event_type.clone();
        let issuer = envelope.issuer.clone();

        match buffer.ingest(&mut engine, envelope, now) {
            Ok(IngestOutcome::Applied(applied)) => {
                if !from_network {
                    if let Some(entry) = applied.first() {
                        let topic = topic_for_family(entry.type_family());
                        match P2pEnvelope::for_event(local_peer_id.clone(), now, topic, entry) {
                            Ok(frame) => {
                                let _ = outbound_tx.send(frame).await;
                            }
                            Err(e) => warn!(error = %e, "failed to encode envelope for gossip"),
                        }
                    }
                }
            }
            Ok(IngestOutcome::Buffered) => {
                info!(event = %event_type, issuer = %issuer, "envelope buffered, awaiting prerequisite nonce");
            }
            Ok(IngestOutcome::Dropped { issuer, family, nonce }) => {
                warn!(%issuer, %family, nonce, "buffer window exceeded, envelope dropped — needs range-sync");
            }
            Err(e) => {
                warn!(event = %event_type, %issuer, error = %e, "envelope rejected");
            }
        }
    }

    Ok(())
}

/// Load genesis parameters from a JSON file, or generate a minimal
/// single-treasury configuration if no path is given.
///
/// # Warning
/// A node started without `--genesis-params` produces an arbitrary supply
/// that cannot be shared with other nodes. Only use this for local
/// development and testing.
fn load_or_generate_genesis_params(path: Option<&Path>) -> anyhow::Result<GenesisParams> {
    if let Some(p) = path {
        let json = std::fs::read_to_string(p)
            .with_context(|| format!("reading genesis params from {}", p.display()))?;
        return serde_json::from_str(&json).context("parsing genesis params JSON");
    }
    warn!("No --genesis-params provided. Generating a bare treasury-only genesis — DO NOT USE IN PRODUCTION.");
    Ok(GenesisParams {
        treasury_initial_balance: 1_000_000_000,
        seed_accounts: Vec::new(),
    })
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
