use clawnet_core::types::Did;

use crate::store::MarketsStore;
use crate::types::{Bid, BidStatus, Lease, Listing, MarketType, Order};

/// Read-side views over markets state. Never mutates the store.
pub struct MarketsQuery<'a, S: MarketsStore> {
    store: &'a S,
}

impl<'a, S: MarketsStore> MarketsQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn listing(&self, listing_id: &str) -> Option<Listing> {
        self.store.get_listing(listing_id)
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.store.get_order(order_id)
    }

    pub fn lease(&self, lease_id: &str) -> Option<Lease> {
        self.store.get_lease(lease_id)
    }

    /// Open bids for a listing, sorted from the bidder's best offer price to
    /// worst (ascending amount — lowest bid is cheapest for the requester).
    pub fn open_bids_by_price(&self, listing_id: &str) -> Vec<Bid> {
        let mut bids: Vec<Bid> = self
            .store
            .bids_for_listing(listing_id)
            .into_iter()
            .filter(|b| b.status == BidStatus::Open)
            .collect();
        bids.sort_by_key(|b| b.amount);
        bids
    }

    pub fn lease_remaining(&self, lease_id: &str) -> Option<u64> {
        self.store.get_lease(lease_id).map(|l| l.remaining())
    }
}

/// Filters requiring an owning collection rather than per-id lookups. The
/// engine's durable store indexes these separately; this helper works over
/// any slice of listings already materialized by the caller (e.g. the
/// engine's sled-backed prefix scan).
pub fn listings_by_type(listings: &[Listing], market_type: MarketType) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| l.market_type == market_type)
        .cloned()
        .collect()
}

pub fn listings_by_seller(listings: &[Listing], seller: &Did) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| &l.seller == seller)
        .cloned()
        .collect()
}
