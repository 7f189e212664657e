// ============================================================================
// Order Book Projection
// Depth levels aggregated from persisted resting orders
// ============================================================================

use arrayvec::ArrayVec;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{Order, Side, Symbol};
use crate::numeric::{Price, Quantity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on levels reported per side
pub const MAX_BOOK_DEPTH: usize = 10;

pub type DepthLevels = ArrayVec<OrderBookLevel, MAX_BOOK_DEPTH>;

// ============================================================================
// Order Book Level
// ============================================================================

/// Aggregated resting quantity at one price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookLevel {
    pub price: Price,
    pub total_quantity: Quantity,
    pub order_count: usize,
}

/// Group resting orders of one side by price and keep the best `depth` levels.
///
/// Bids come out highest price first, asks lowest price first. Orders that
/// are not resting, belong to the other side, or carry no price are ignored.
pub fn aggregate_levels<'a, I>(side: Side, orders: I, depth: usize) -> DepthLevels
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut by_price: BTreeMap<Price, (Quantity, usize)> = BTreeMap::new();

    for order in orders {
        if order.side != side || !order.is_resting() {
            continue;
        }
        if let Some(price) = order.price() {
            // Saturates: a level reports at most u64::MAX units
            let entry = by_price.entry(price).or_insert((0, 0));
            entry.0 = entry.0.saturating_add(order.get_remaining_quantity());
            entry.1 += 1;
        }
    }

    let depth = depth.min(MAX_BOOK_DEPTH);
    match side {
        Side::Buy => take_levels(by_price.into_iter().rev(), depth),
        Side::Sell => take_levels(by_price.into_iter(), depth),
    }
}

fn take_levels<I>(levels: I, depth: usize) -> DepthLevels
where
    I: Iterator<Item = (Price, (Quantity, usize))>,
{
    levels
        .take(depth)
        .map(|(price, (total_quantity, order_count))| OrderBookLevel {
            price,
            total_quantity,
            order_count,
        })
        .collect()
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable snapshot of the order book state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub symbol: Symbol,
    /// Bid levels, highest price first
    pub bids: DepthLevels,
    /// Ask levels, lowest price first
    pub asks: DepthLevels,
}

impl OrderBookSnapshot {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: ArrayVec::new(),
            asks: ArrayVec::new(),
        }
    }

    pub fn with_depth(symbol: Symbol, bids: DepthLevels, asks: DepthLevels) -> Self {
        Self { symbol, bids, asks }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Current spread (ask - bid)
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.value() - bid.value()),
            _ => None,
        }
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.value() + ask.value()) / Decimal::from(2)),
            _ => None,
        }
    }

    /// Saturating sum of the reported bid levels
    pub fn total_bid_quantity(&self) -> Quantity {
        saturating_total(&self.bids)
    }

    pub fn total_ask_quantity(&self) -> Quantity {
        saturating_total(&self.asks)
    }
}

fn saturating_total(levels: &DepthLevels) -> Quantity {
    levels
        .iter()
        .fold(0, |total: Quantity, level| total.saturating_add(level.total_quantity))
}
