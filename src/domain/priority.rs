// ============================================================================
// Price/Time Priority
// Deterministic ordering of resting orders, independent of storage
// ============================================================================

use super::{Order, Side};
use crate::numeric::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Sort key giving price/time priority within one side of the book.
///
/// Keys compare ascending in matching order:
/// - asks: lowest price first, then oldest
/// - bids: highest price first, then oldest
///
/// Bids store the negated price so both sides share a single ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookKey {
    rank: Decimal,
    created_at: DateTime<Utc>,
    sequence: u64,
}

impl BookKey {
    pub fn new(side: Side, price: Price, created_at: DateTime<Utc>, sequence: u64) -> Self {
        let rank = match side {
            Side::Sell => price.value(),
            Side::Buy => -price.value(),
        };
        Self {
            rank,
            created_at,
            sequence,
        }
    }

    /// Key for a limit order; market orders never rest and have none.
    pub fn for_order(order: &Order) -> Option<Self> {
        order
            .price()
            .map(|price| Self::new(order.side, price, order.created_at, order.sequence))
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Compare two same-side orders by price/time priority.
///
/// Market orders sort after every limit order.
pub fn price_time_cmp(a: &Order, b: &Order) -> Ordering {
    match (BookKey::for_order(a), BookKey::for_order(b)) {
        (Some(ka), Some(kb)) => ka.cmp(&kb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => (a.created_at, a.sequence).cmp(&(b.created_at, b.sequence)),
    }
}

/// Whether an incoming order on `incoming_side` with optional `limit` can
/// trade against a resting order priced at `resting_price`.
///
/// A missing limit (market order) crosses everything.
pub fn crosses(incoming_side: Side, limit: Option<Price>, resting_price: Price) -> bool {
    match limit {
        None => true,
        Some(limit) => match incoming_side {
            Side::Buy => limit >= resting_price,
            Side::Sell => limit <= resting_price,
        },
    }
}
