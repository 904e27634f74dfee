use clawnet_core::types::{Balance, Did, Hash32, Timestamp};
use serde::{Deserialize, Serialize};

// ── Listings ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Info,
    Task,
    Capability,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Paused,
    SoldOut,
    Expired,
    Removed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiddingMode {
    Open,
    Sealed,
    Reverse,
}

/// Market-type-specific listing data. Every variant maps 1:1 to
/// `Listing::market_type`; the engine rejects a payload whose `marketData`
/// tag disagrees with its `marketType`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketData {
    Info {
        /// BLAKE3 hash of the plaintext content; the content itself lives
        /// in an out-of-band store this reducer never touches.
        content_hash: Hash32,
    },
    Task {
        bidding_mode: BiddingMode,
        budget: Balance,
    },
    Capability {
        quota_schema: serde_json::Value,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ListingStats {
    pub views: u64,
    pub orders: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub seller: Did,
    pub market_type: MarketType,
    pub market_data: MarketData,
    pub pricing: Balance,
    pub status: ListingStatus,
    #[serde(default)]
    pub stats: ListingStats,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    PaymentPending,
    Paid,
    InProgress,
    Delivered,
    Completed,
    Cancelled,
    Disputed,
    Refunded,
}

/// Allowed order-status transitions (§4.4's FSM diagram).
pub fn order_transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Accepted)
            | (Pending, Cancelled)
            | (Pending, Disputed)
            | (Accepted, PaymentPending)
            | (Accepted, Cancelled)
            | (Accepted, Disputed)
            | (PaymentPending, Paid)
            | (PaymentPending, Disputed)
            | (Paid, InProgress)
            | (Paid, Disputed)
            | (InProgress, Delivered)
            | (InProgress, Disputed)
            | (Delivered, Completed)
            | (Delivered, Disputed)
            | (Disputed, Completed)
            | (Disputed, Refunded)
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub listing_id: String,
    pub buyer: Did,
    pub seller: Did,
    pub amount: Balance,
    pub escrow_id: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub reviews: Vec<OrderReview>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderReview {
    pub reviewer: Did,
    pub rating: u8,
    #[serde(default)]
    pub sub_scores: Option<serde_json::Value>,
    pub submitted_at: Timestamp,
}

// ── Bids (task market) ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Open,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub listing_id: String,
    pub bidder: Did,
    pub amount: Balance,
    pub status: BidStatus,
    pub created_at: Timestamp,
}

// ── Leases (capability market) ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lease {
    pub id: String,
    pub listing_id: String,
    pub lessee: Did,
    pub quota: u64,
    pub used: u64,
    pub credentials: serde_json::Value,
    pub created_at: Timestamp,
}

impl Lease {
    pub fn remaining(&self) -> u64 {
        self.quota.saturating_sub(self.used)
    }
}
