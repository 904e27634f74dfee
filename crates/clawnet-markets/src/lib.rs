pub mod effects;
pub mod events;
pub mod query;
pub mod reducer;
pub mod store;
pub mod types;

pub use effects::MarketsEffect;
pub use events::{parse_payload, MarketsEvent};
pub use query::{listings_by_seller, listings_by_type, MarketsQuery};
pub use reducer::apply;
pub use store::MarketsStore;
pub use types::{
    Bid, BiddingMode, BidStatus, Lease, Listing, ListingStats, ListingStatus, MarketData,
    MarketType, Order, OrderReview, OrderStatus,
};
