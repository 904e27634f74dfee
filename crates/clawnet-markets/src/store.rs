use crate::types::{Bid, Lease, Listing, Order};

/// Storage seam between this reducer and the engine's durable state.
pub trait MarketsStore {
    fn get_listing(&self, listing_id: &str) -> Option<Listing>;
    fn put_listing(&mut self, listing: Listing);

    fn get_order(&self, order_id: &str) -> Option<Order>;
    fn put_order(&mut self, order: Order);

    fn get_bid(&self, bid_id: &str) -> Option<Bid>;
    fn put_bid(&mut self, bid: Bid);
    fn bids_for_listing(&self, listing_id: &str) -> Vec<Bid>;

    fn get_lease(&self, lease_id: &str) -> Option<Lease>;
    fn put_lease(&mut self, lease: Lease);
}
