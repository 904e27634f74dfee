use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClawNetError {
    // ── Envelope validation ──────────────────────────────────────────────────
    #[error("envelope failed schema validation: {0}")]
    SchemaInvalid(String),

    #[error("envelope hash mismatch: computed {computed}, declared {declared}")]
    HashMismatch { computed: String, declared: String },

    #[error("envelope signature does not verify")]
    BadSignature,

    #[error("canonical encoding mismatch: payload does not re-encode identically")]
    CanonicalizationMismatch,

    #[error("unknown issuer: no DID document for {0}")]
    UnknownIssuer(String),

    #[error(
        "nonce out of order for issuer {issuer} family {family}: expected {expected}, got {got}"
    )]
    NonceOutOfOrder {
        issuer: String,
        family: String,
        expected: u64,
        got: u64,
    },

    #[error("resourcePrev does not match current head for resource {resource}: expected {expected}, got {got}")]
    ResourcePrevMismatch {
        resource: String,
        expected: String,
        got: String,
    },

    #[error("duplicate event: hash {0} already applied")]
    DuplicateEvent(String),

    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u32),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    // ── Identity errors ──────────────────────────────────────────────────────
    #[error("DID document already exists: {0}")]
    DidAlreadyExists(String),

    #[error("DID document not found: {0}")]
    DidNotFound(String),

    #[error("DID is not bound to the signing key used")]
    DidKeyBindingMismatch,

    #[error("identity update must be signed by the previous authentication key")]
    RotationSignerMismatch,

    #[error("platform link already verified for platform {0}")]
    PlatformLinkAlreadyVerified(String),

    #[error("capability credential not found: {0}")]
    CapabilityCredentialNotFound(String),

    #[error("capability credential has expired")]
    CapabilityCredentialExpired,

    // ── Wallet errors ────────────────────────────────────────────────────────
    #[error("insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: u128, have: u128 },

    #[error("self-transfer not allowed")]
    SelfTransfer,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("unknown address: {0}")]
    UnknownAddress(String),

    #[error("escrow not found: {0}")]
    EscrowNotFound(String),

    #[error("escrow is not funded")]
    EscrowNotFunded,

    #[error("escrow already released")]
    EscrowAlreadyReleased,

    #[error("escrow release condition not satisfied")]
    EscrowReleaseConditionUnmet,

    #[error("escrow release rule is malformed: {0}")]
    EscrowRuleInvalid(String),

    #[error("only the escrow's designated arbiter may resolve a dispute")]
    NotEscrowArbiter,

    // ── Markets errors ───────────────────────────────────────────────────────
    #[error("listing not found: {0}")]
    ListingNotFound(String),

    #[error("listing status {status} does not permit this operation")]
    ListingStatusInvalid { status: String },

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("order FSM violation: cannot move from {from} to {to}")]
    OrderFsmViolation { from: String, to: String },

    #[error("bid not found: {0}")]
    BidNotFound(String),

    #[error("bid amount below listing reserve")]
    BidBelowReserve,

    #[error("only the listing owner may accept a bid")]
    NotListingOwner,

    #[error("usage record exceeds leased quota")]
    UsageQuotaExceeded,

    #[error("market dispute already open for order {0}")]
    MarketDisputeAlreadyOpen(String),

    // ── Contracts errors ─────────────────────────────────────────────────────
    #[error("contract not found: {0}")]
    ContractNotFound(String),

    #[error("contract has not been signed by all parties")]
    ContractNotSigned,

    #[error("contract is not in the active state")]
    ContractNotActive,

    #[error("party {0} has already signed this contract")]
    AlreadySigned(String),

    #[error("signer {0} is not a party to this contract")]
    NotAContractParty(String),

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("milestone has not been submitted for review")]
    MilestoneNotSubmitted,

    #[error("milestone is already approved")]
    MilestoneAlreadyApproved,

    #[error("milestone ordering violated: milestone {0} is not next in sequence")]
    MilestoneOutOfSequence(String),

    #[error("contract dispute already open")]
    ContractDisputeAlreadyOpen,

    #[error("only a contract party or designated arbiter may open a dispute")]
    NotDisputeEligible,

    // ── Reputation errors ────────────────────────────────────────────────────
    #[error("cannot submit a review of oneself")]
    SelfReview,

    #[error("review references a contract or order that does not involve the reviewer")]
    ReferenceInvalid,

    #[error("review already submitted for this reference")]
    DuplicateReview,

    #[error("reputation dimension unknown: {0}")]
    UnknownReputationDimension(String),

    // ── DAO errors ────────────────────────────────────────────────────────────
    #[error("proposal not found: {0}")]
    ProposalNotFound(String),

    #[error("proposal is not open for voting")]
    ProposalNotOpen,

    #[error("proposal quorum not met")]
    ProposalQuorumUnmet,

    #[error("proposal threshold not met")]
    ProposalThresholdUnmet,

    #[error("voter has already voted on this proposal")]
    AlreadyVoted,

    #[error("delegation would create a cycle through {0}")]
    DelegationCycle(String),

    #[error("cannot delegate to self")]
    SelfDelegation,

    #[error("timelock has not yet elapsed; executable at {executable_at}")]
    TimelockNotElapsed { executable_at: i64 },

    #[error("proposal has already been executed")]
    ProposalAlreadyExecuted,

    #[error("proposal was not approved and cannot be executed")]
    ProposalNotApproved,

    #[error("treasury balance insufficient for proposed spend: need {need}, have {have}")]
    TreasuryInsufficientBalance { need: u128, have: u128 },

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ── Genesis ──────────────────────────────────────────────────────────────
    #[error("genesis treasury supply mismatch: expected {expected}, got {got}")]
    GenesisSupplyMismatch { expected: u128, got: u128 },

    #[error("genesis has already been applied to this store")]
    GenesisAlreadyApplied,

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}
