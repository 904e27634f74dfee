//! ─── ClawNet Protocol Constants ─────────────────────────────────────────────
//!
//! Base unit: one token, no sub-unit denomination (see `Balance`).
//!
//! A few of these are marked "DAO-governable" — a live deployment would let
//! a passed-and-executed DAO proposal overwrite them in state. This
//! implementation treats all of them as structurally fixed constants; wiring
//! a proposal-driven override is future work, noted where it matters.

// ── Treasury ──────────────────────────────────────────────────────────────────

/// DID of the protocol treasury account. Seeded at genesis, and the sole
/// destination for every transfer fee collected by the wallet reducer
/// (resolved open question — fees are never burned).
pub const TREASURY_DID: &str = "did:claw:ztreasury0000000000000000000000000000000000000";

/// Wallet address of the protocol treasury. Unlike ordinary addresses this
/// is not derived from any Ed25519 public key — the treasury never
/// originates signed envelopes, only receives fee and spend credits — so it
/// is assigned directly rather than via `Address::from_public_key`.
pub const TREASURY_ADDRESS: &str = "clawTreasury00000000000000000000000000";

// ── Wallet: fees ──────────────────────────────────────────────────────────────

/// Transfer fee, in basis points of the transferred amount. DAO-governable.
pub const TRANSFER_FEE_BPS: u32 = 10; // 0.10%

/// Escrow creation fee, in basis points of the escrowed amount. DAO-governable.
pub const ESCROW_FEE_BPS: u32 = 25; // 0.25%

pub const BASIS_POINTS_DENOMINATOR: u32 = 10_000;

// ── Markets: fees ─────────────────────────────────────────────────────────────

/// Marketplace commission taken on a completed order, in basis points of the
/// order value, credited to the treasury alongside transfer/escrow fees.
/// DAO-governable.
pub const MARKET_COMMISSION_BPS: u32 = 150; // 1.50%

// ── Nonce / envelope ordering ─────────────────────────────────────────────────

/// Maximum number of out-of-order envelopes buffered per `(issuer, family)`
/// while waiting for a nonce gap to close before the oldest is dropped.
pub const NONCE_BUFFER_WINDOW: usize = 64;

/// Envelope format version accepted by this implementation.
pub const ENVELOPE_VERSION: u32 = 1;

// ── Reputation decay ──────────────────────────────────────────────────────────

/// Half-life of a reputation signal's weight, in days.
pub const REPUTATION_HALF_LIFE_DAYS: f64 = 90.0;

/// Floor below which a fully-decayed signal's weight is treated as zero and
/// excluded from the aggregate rather than contributing noise.
pub const REPUTATION_MIN_WEIGHT: f64 = 0.1;

/// Signals older than this are excluded from aggregation entirely,
/// regardless of decayed weight.
pub const REPUTATION_MAX_AGE_DAYS: f64 = 730.0; // 2 years

/// Score assigned to a dimension with no contributing records yet.
pub const REPUTATION_BASELINE_SCORE: f64 = 500.0;

/// Per-dimension weights used when folding dimension scores into the single
/// composite score returned by `ReputationQuery::composite`.
pub const REPUTATION_DIMENSION_WEIGHT_QUALITY: f64 = 0.30;
pub const REPUTATION_DIMENSION_WEIGHT_RELIABILITY: f64 = 0.25;
pub const REPUTATION_DIMENSION_WEIGHT_TIMELINESS: f64 = 0.20;
pub const REPUTATION_DIMENSION_WEIGHT_TRANSACTION: f64 = 0.15;
pub const REPUTATION_DIMENSION_WEIGHT_COMMUNICATION: f64 = 0.10;

/// Fraud-signal thresholds (§4.6): more than this many records targeting one
/// DID within `FRAUD_BURST_WINDOW_SECS` is flagged `burst`.
pub const FRAUD_BURST_THRESHOLD: usize = 10;
pub const FRAUD_BURST_WINDOW_SECS: i64 = 3600;

/// Window within which an A-reviews-B-reviews-A pattern is flagged
/// `circular`.
pub const FRAUD_CIRCULAR_WINDOW_SECS: i64 = 24 * 3600;

// ── DAO governance ────────────────────────────────────────────────────────────

/// Minimum DID-weighted voting power required to submit a proposal.
pub const PROPOSAL_SUBMIT_THRESHOLD: u128 = 1_000;

/// Proposal voting window, in seconds. DAO-governable.
pub const PROPOSAL_VOTING_WINDOW_SECS: i64 = 7 * 24 * 3600;

/// Minimum fraction of total registered voting power that must participate
/// for a proposal's result to be binding (numerator / denominator).
pub const PROPOSAL_QUORUM_NUM: u64 = 10;
pub const PROPOSAL_QUORUM_DEN: u64 = 100;

/// Fraction of cast votes that must be in favor for a proposal to pass.
pub const PROPOSAL_APPROVAL_NUM: u64 = 1;
pub const PROPOSAL_APPROVAL_DEN: u64 = 2;

/// Timelock delay between a proposal passing and its execution becoming
/// eligible, in seconds. Longer for treasury-spend and parameter-change
/// proposals than for purely advisory ones. DAO-governable.
pub const TIMELOCK_DELAY_STANDARD_SECS: i64 = 2 * 24 * 3600;
pub const TIMELOCK_DELAY_TREASURY_SECS: i64 = 5 * 24 * 3600;
pub const TIMELOCK_DELAY_PARAMETER_SECS: i64 = 7 * 24 * 3600;

/// Maximum lockup bonus multiplier (voting power scales with reputation and
/// with a capped bonus for longer self-imposed token lockups).
pub const MAX_LOCKUP_BONUS_BPS: u32 = 5_000; // up to +50%

/// Lockup duration, in seconds, at which the maximum bonus is reached.
pub const MAX_LOCKUP_BONUS_DURATION_SECS: i64 = 365 * 24 * 3600;

// ── Contracts ─────────────────────────────────────────────────────────────────

/// Maximum number of milestones permitted on a single service contract.
pub const MAX_MILESTONES_PER_CONTRACT: usize = 64;

/// Maximum number of parties permitted on a single multi-party contract.
pub const MAX_CONTRACT_PARTIES: usize = 16;

// ── Payload size limits ───────────────────────────────────────────────────────

/// Maximum size, in bytes, of an envelope's canonical-JSON payload.
pub const MAX_PAYLOAD_BYTES: usize = 65_536;

/// Maximum length of a free-text memo/description field.
pub const MAX_MEMO_BYTES: usize = 1_024;
