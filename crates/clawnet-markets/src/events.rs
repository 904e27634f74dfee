use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Balance, Did};
use serde_json::Value;

use crate::types::{Bid, Lease, Listing, OrderReview, OrderStatus};

#[derive(Clone, Debug)]
pub enum MarketsEvent {
    ListingPublish {
        listing: Listing,
    },
    ListingUpdate {
        listing_id: String,
        status: Option<crate::types::ListingStatus>,
        pricing: Option<Balance>,
    },
    OrderCreate {
        order_id: String,
        listing_id: String,
        buyer: Did,
        amount: Balance,
        escrow_id: Option<String>,
    },
    OrderUpdate {
        order_id: String,
        new_status: OrderStatus,
    },
    OrderReview {
        order_id: String,
        review: OrderReview,
    },
    BidCreate {
        bid: Bid,
    },
    BidAccept {
        listing_id: String,
        bid_id: String,
    },
    LeaseCreate {
        lease: Lease,
    },
    UsageRecord {
        lease_id: String,
        quota_used: u64,
        cost: Balance,
    },
    DisputeOpen {
        order_id: String,
    },
}

fn parse_balance(value: &Value) -> Result<Balance, ClawNetError> {
    value
        .as_str()
        .ok_or_else(|| ClawNetError::SchemaInvalid("amount must be a decimal string".into()))?
        .parse::<Balance>()
        .map_err(|_| ClawNetError::SchemaInvalid("not a valid decimal amount".into()))
}

fn required<'a>(payload: &'a Value, field: &'static str) -> Result<&'a Value, ClawNetError> {
    payload
        .get(field)
        .ok_or_else(|| ClawNetError::SchemaInvalid(format!("missing field `{field}`")))
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ClawNetError> {
    serde_json::from_value(value.clone()).map_err(|e| ClawNetError::SchemaInvalid(e.to_string()))
}

pub fn parse_payload(event_type: &str, payload: &Value) -> Result<MarketsEvent, ClawNetError> {
    match event_type {
        "market.listing.publish" => Ok(MarketsEvent::ListingPublish {
            listing: decode(required(payload, "listing")?)?,
        }),
        "market.listing.update" => Ok(MarketsEvent::ListingUpdate {
            listing_id: decode(required(payload, "listingId")?)?,
            status: payload.get("status").map(decode).transpose()?,
            pricing: payload
                .get("pricing")
                .map(parse_balance)
                .transpose()?,
        }),
        "market.order.create" => Ok(MarketsEvent::OrderCreate {
            order_id: decode(required(payload, "orderId")?)?,
            listing_id: decode(required(payload, "listingId")?)?,
            buyer: decode(required(payload, "buyer")?)?,
            amount: parse_balance(required(payload, "amount")?)?,
            escrow_id: payload.get("escrowId").map(decode).transpose()?,
        }),
        "market.order.update" => Ok(MarketsEvent::OrderUpdate {
            order_id: decode(required(payload, "orderId")?)?,
            new_status: decode(required(payload, "status")?)?,
        }),
        "market.order.review" => Ok(MarketsEvent::OrderReview {
            order_id: decode(required(payload, "orderId")?)?,
            review: decode(required(payload, "review")?)?,
        }),
        "market.task.bid.create" => Ok(MarketsEvent::BidCreate {
            bid: decode(required(payload, "bid")?)?,
        }),
        "market.task.bid.accept" => Ok(MarketsEvent::BidAccept {
            listing_id: decode(required(payload, "listingId")?)?,
            bid_id: decode(required(payload, "bidId")?)?,
        }),
        "market.capability.lease" => Ok(MarketsEvent::LeaseCreate {
            lease: decode(required(payload, "lease")?)?,
        }),
        "market.capability.usage" => Ok(MarketsEvent::UsageRecord {
            lease_id: decode(required(payload, "leaseId")?)?,
            quota_used: decode(required(payload, "quotaUsed")?)?,
            cost: parse_balance(required(payload, "cost")?)?,
        }),
        "market.dispute.open" => Ok(MarketsEvent::DisputeOpen {
            order_id: decode(required(payload, "orderId")?)?,
        }),
        other => Err(ClawNetError::UnknownEventType(other.to_string())),
    }
}
