use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Did, Hash32, Timestamp};

use crate::effects::MarketsEffect;
use crate::events::MarketsEvent;
use crate::store::MarketsStore;
use crate::types::{
    order_transition_allowed, BidStatus, ListingStatus, MarketType, OrderStatus,
};

/// Apply a parsed `MarketsEvent` issued by `issuer` at time `now`.
///
/// `envelope_hash` is the hash of the envelope carrying this event — used to
/// derive deterministic ids for entities created as a side effect (the
/// contract/order pair created by a bid acceptance, §8 scenario 3).
pub fn apply(
    event: &MarketsEvent,
    issuer: &Did,
    now: Timestamp,
    envelope_hash: Hash32,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    match event {
        MarketsEvent::ListingPublish { listing } => {
            apply_listing_publish(listing, issuer, now, store)
        }
        MarketsEvent::ListingUpdate {
            listing_id,
            status,
            pricing,
        } => apply_listing_update(listing_id, *status, *pricing, issuer, now, store),
        MarketsEvent::OrderCreate {
            order_id,
            listing_id,
            buyer,
            amount,
            escrow_id,
        } => apply_order_create(order_id, listing_id, buyer, *amount, escrow_id.clone(), now, store),
        MarketsEvent::OrderUpdate {
            order_id,
            new_status,
        } => apply_order_update(order_id, *new_status, now, store),
        MarketsEvent::OrderReview { order_id, review } => {
            apply_order_review(order_id, review, issuer, store)
        }
        MarketsEvent::BidCreate { bid } => apply_bid_create(bid, issuer, store),
        MarketsEvent::BidAccept {
            listing_id,
            bid_id,
        } => apply_bid_accept(listing_id, bid_id, issuer, envelope_hash, store),
        MarketsEvent::LeaseCreate { lease } => apply_lease_create(lease, store),
        MarketsEvent::UsageRecord {
            lease_id,
            quota_used,
            cost,
        } => apply_usage_record(lease_id, *quota_used, *cost, store),
        MarketsEvent::DisputeOpen { order_id } => apply_dispute_open(order_id, store),
    }
}

fn apply_listing_publish(
    listing: &crate::types::Listing,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    if &listing.seller != issuer {
        return Err(ClawNetError::SchemaInvalid(
            "listing seller must match the issuing DID".into(),
        ));
    }
    if store.get_listing(&listing.id).is_some() {
        return Err(ClawNetError::SchemaInvalid(format!(
            "listing {} already exists",
            listing.id
        )));
    }
    let mut listing = listing.clone();
    listing.status = ListingStatus::Active;
    listing.created_at = now;
    listing.updated_at = now;
    store.put_listing(listing);
    Ok(vec![])
}

fn apply_listing_update(
    listing_id: &str,
    status: Option<ListingStatus>,
    pricing: Option<clawnet_core::types::Balance>,
    issuer: &Did,
    now: Timestamp,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let mut listing = store
        .get_listing(listing_id)
        .ok_or_else(|| ClawNetError::ListingNotFound(listing_id.to_string()))?;
    if &listing.seller != issuer {
        return Err(ClawNetError::NotListingOwner);
    }
    if let Some(status) = status {
        listing.status = status;
    }
    if let Some(pricing) = pricing {
        listing.pricing = pricing;
    }
    listing.updated_at = now;
    store.put_listing(listing);
    Ok(vec![])
}

fn apply_order_create(
    order_id: &str,
    listing_id: &str,
    buyer: &Did,
    amount: clawnet_core::types::Balance,
    escrow_id: Option<String>,
    now: Timestamp,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let mut listing = store
        .get_listing(listing_id)
        .ok_or_else(|| ClawNetError::ListingNotFound(listing_id.to_string()))?;
    if listing.status != ListingStatus::Active {
        return Err(ClawNetError::ListingStatusInvalid {
            status: format!("{:?}", listing.status),
        });
    }
    if store.get_order(order_id).is_some() {
        return Err(ClawNetError::SchemaInvalid(format!(
            "order {order_id} already exists"
        )));
    }

    let order = crate::types::Order {
        id: order_id.to_string(),
        listing_id: listing_id.to_string(),
        buyer: buyer.clone(),
        seller: listing.seller.clone(),
        amount,
        escrow_id,
        status: OrderStatus::Pending,
        reviews: vec![],
        created_at: now,
        updated_at: now,
    };
    store.put_order(order);

    listing.stats.orders += 1;
    store.put_listing(listing);
    Ok(vec![])
}

fn apply_order_update(
    order_id: &str,
    new_status: OrderStatus,
    now: Timestamp,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let mut order = store
        .get_order(order_id)
        .ok_or_else(|| ClawNetError::OrderNotFound(order_id.to_string()))?;

    if !order_transition_allowed(order.status, new_status) {
        return Err(ClawNetError::OrderFsmViolation {
            from: format!("{:?}", order.status),
            to: format!("{:?}", new_status),
        });
    }
    order.status = new_status;
    order.updated_at = now;
    store.put_order(order);
    Ok(vec![])
}

fn apply_order_review(
    order_id: &str,
    review: &crate::types::OrderReview,
    issuer: &Did,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let mut order = store
        .get_order(order_id)
        .ok_or_else(|| ClawNetError::OrderNotFound(order_id.to_string()))?;

    if order.status != OrderStatus::Completed {
        return Err(ClawNetError::OrderFsmViolation {
            from: format!("{:?}", order.status),
            to: "reviewed".to_string(),
        });
    }

    let target = if issuer == &order.buyer {
        order.seller.clone()
    } else if issuer == &order.seller {
        order.buyer.clone()
    } else {
        return Err(ClawNetError::ReferenceInvalid);
    };
    if issuer == &target {
        return Err(ClawNetError::SelfReview);
    }
    if order.reviews.iter().any(|r| &r.reviewer == issuer) {
        return Err(ClawNetError::DuplicateReview);
    }

    order.reviews.push(review.clone());
    store.put_order(order);

    // 1..=5 maps onto the reputation engine's 0..=1000 scale.
    let score = (review.rating.clamp(1, 5) as u16) * 200;
    Ok(vec![MarketsEffect::EmitReputationRecord {
        target,
        dimension: "quality".to_string(),
        score,
        reference: order_id.to_string(),
    }])
}

fn apply_bid_create(
    bid: &crate::types::Bid,
    issuer: &Did,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    if &bid.bidder != issuer {
        return Err(ClawNetError::SchemaInvalid(
            "bid bidder must match the issuing DID".into(),
        ));
    }
    let listing = store
        .get_listing(&bid.listing_id)
        .ok_or_else(|| ClawNetError::ListingNotFound(bid.listing_id.clone()))?;
    if listing.market_type != MarketType::Task {
        return Err(ClawNetError::SchemaInvalid(
            "bids may only be placed on task listings".into(),
        ));
    }
    if listing.status != ListingStatus::Active {
        return Err(ClawNetError::ListingStatusInvalid {
            status: format!("{:?}", listing.status),
        });
    }
    let mut bid = bid.clone();
    bid.status = BidStatus::Open;
    store.put_bid(bid);
    Ok(vec![])
}

fn apply_bid_accept(
    listing_id: &str,
    bid_id: &str,
    issuer: &Did,
    envelope_hash: Hash32,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let listing = store
        .get_listing(listing_id)
        .ok_or_else(|| ClawNetError::ListingNotFound(listing_id.to_string()))?;
    if &listing.seller != issuer {
        return Err(ClawNetError::NotListingOwner);
    }

    let accepted_bid = store
        .get_bid(bid_id)
        .ok_or_else(|| ClawNetError::BidNotFound(bid_id.to_string()))?;
    if accepted_bid.status != BidStatus::Open {
        return Err(ClawNetError::SchemaInvalid(
            "bid is not open and cannot be accepted".into(),
        ));
    }

    let mut accepted = accepted_bid.clone();
    accepted.status = BidStatus::Accepted;
    store.put_bid(accepted);

    for mut other in store.bids_for_listing(listing_id) {
        if other.id != bid_id && other.status == BidStatus::Open {
            other.status = BidStatus::Rejected;
            store.put_bid(other);
        }
    }

    let hash_hex = envelope_hash.to_hex();
    let contract_id = format!("contract-{hash_hex}");
    let order_id = format!("order-{hash_hex}");

    Ok(vec![MarketsEffect::CreateContractForBid {
        contract_id,
        order_id,
        listing_id: listing_id.to_string(),
        client: issuer.clone(),
        provider: accepted_bid.bidder,
        total: accepted_bid.amount,
    }])
}

fn apply_lease_create(
    lease: &crate::types::Lease,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let listing = store
        .get_listing(&lease.listing_id)
        .ok_or_else(|| ClawNetError::ListingNotFound(lease.listing_id.clone()))?;
    if listing.market_type != MarketType::Capability {
        return Err(ClawNetError::SchemaInvalid(
            "leases may only be created against capability listings".into(),
        ));
    }
    store.put_lease(lease.clone());
    Ok(vec![])
}

fn apply_usage_record(
    lease_id: &str,
    quota_used: u64,
    cost: clawnet_core::types::Balance,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let mut lease = store
        .get_lease(lease_id)
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("lease {lease_id} not found")))?;
    if quota_used > lease.remaining() {
        return Err(ClawNetError::UsageQuotaExceeded);
    }
    let listing = store
        .get_listing(&lease.listing_id)
        .ok_or_else(|| ClawNetError::ListingNotFound(lease.listing_id.clone()))?;

    lease.used += quota_used;
    store.put_lease(lease.clone());

    Ok(vec![MarketsEffect::EmitWalletTransfer {
        from: lease.lessee,
        to: listing.seller,
        amount: cost,
    }])
}

fn apply_dispute_open(
    order_id: &str,
    store: &mut impl MarketsStore,
) -> Result<Vec<MarketsEffect>, ClawNetError> {
    let mut order = store
        .get_order(order_id)
        .ok_or_else(|| ClawNetError::OrderNotFound(order_id.to_string()))?;
    if order.status == OrderStatus::Disputed {
        return Err(ClawNetError::MarketDisputeAlreadyOpen(order_id.to_string()));
    }
    if !order_transition_allowed(order.status, OrderStatus::Disputed) {
        return Err(ClawNetError::OrderFsmViolation {
            from: format!("{:?}", order.status),
            to: "disputed".to_string(),
        });
    }
    order.status = OrderStatus::Disputed;
    store.put_order(order);
    Ok(vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bid, Listing, MarketData, ListingStats};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        listings: HashMap<String, Listing>,
        orders: HashMap<String, crate::types::Order>,
        bids: HashMap<String, Bid>,
    }

    impl MarketsStore for MemStore {
        fn get_listing(&self, id: &str) -> Option<Listing> {
            self.listings.get(id).cloned()
        }
        fn put_listing(&mut self, listing: Listing) {
            self.listings.insert(listing.id.clone(), listing);
        }
        fn get_order(&self, id: &str) -> Option<crate::types::Order> {
            self.orders.get(id).cloned()
        }
        fn put_order(&mut self, order: crate::types::Order) {
            self.orders.insert(order.id.clone(), order);
        }
        fn get_bid(&self, id: &str) -> Option<Bid> {
            self.bids.get(id).cloned()
        }
        fn put_bid(&mut self, bid: Bid) {
            self.bids.insert(bid.id.clone(), bid);
        }
        fn bids_for_listing(&self, listing_id: &str) -> Vec<Bid> {
            self.bids
                .values()
                .filter(|b| b.listing_id == listing_id)
                .cloned()
                .collect()
        }
        fn get_lease(&self, _id: &str) -> Option<crate::types::Lease> {
            None
        }
        fn put_lease(&mut self, _lease: crate::types::Lease) {}
    }

    fn did(s: &str) -> Did {
        Did(s.to_string())
    }

    #[test]
    fn bid_accept_rejects_losing_bids_and_emits_contract_effect() {
        let mut store = MemStore::default();
        let seller = did("did:claw:zC");
        store.put_listing(Listing {
            id: "task-1".into(),
            seller: seller.clone(),
            market_type: MarketType::Task,
            market_data: MarketData::Task {
                bidding_mode: crate::types::BiddingMode::Open,
                budget: 50,
            },
            pricing: 50,
            status: ListingStatus::Active,
            stats: ListingStats::default(),
            created_at: 0,
            updated_at: 0,
        });

        let p1 = did("did:claw:zP1");
        let p2 = did("did:claw:zP2");
        apply_bid_create(
            &Bid {
                id: "bid-1".into(),
                listing_id: "task-1".into(),
                bidder: p1.clone(),
                amount: 45,
                status: BidStatus::Open,
                created_at: 0,
            },
            &p1,
            &mut store,
        )
        .unwrap();
        apply_bid_create(
            &Bid {
                id: "bid-2".into(),
                listing_id: "task-1".into(),
                bidder: p2.clone(),
                amount: 40,
                status: BidStatus::Open,
                created_at: 0,
            },
            &p2,
            &mut store,
        )
        .unwrap();

        let effects = apply_bid_accept(
            "task-1",
            "bid-2",
            &seller,
            Hash32::of(b"accept-envelope"),
            &mut store,
        )
        .unwrap();

        assert_eq!(store.get_bid("bid-1").unwrap().status, BidStatus::Rejected);
        assert_eq!(store.get_bid("bid-2").unwrap().status, BidStatus::Accepted);
        assert!(matches!(
            effects.as_slice(),
            [MarketsEffect::CreateContractForBid { total: 40, .. }]
        ));
    }

    #[test]
    fn order_review_rejects_self_review_and_duplicate() {
        let mut store = MemStore::default();
        let buyer = did("did:claw:zB");
        let seller = did("did:claw:zS");
        store.put_order(crate::types::Order {
            id: "order-1".into(),
            listing_id: "listing-1".into(),
            buyer: buyer.clone(),
            seller: seller.clone(),
            amount: 10,
            escrow_id: None,
            status: OrderStatus::Completed,
            reviews: vec![],
            created_at: 0,
            updated_at: 0,
        });

        let review = crate::types::OrderReview {
            reviewer: buyer.clone(),
            rating: 5,
            sub_scores: None,
            submitted_at: 0,
        };
        let effects = apply_order_review("order-1", &review, &buyer, &mut store).unwrap();
        assert!(matches!(
            effects.as_slice(),
            [MarketsEffect::EmitReputationRecord { score: 1000, .. }]
        ));

        let err = apply_order_review("order-1", &review, &buyer, &mut store).unwrap_err();
        assert!(matches!(err, ClawNetError::DuplicateReview));
    }
}
