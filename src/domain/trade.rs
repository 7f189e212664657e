// ============================================================================
// Trade Domain Model
// ============================================================================

use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

use super::{Order, OrderId, Side, Symbol};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TradeId(Uuid);

impl TradeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An execution that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrade {
    pub symbol: Symbol,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub taker_side: Side,
}

impl NewTrade {
    /// Build an execution between an incoming order and a resting one,
    /// resolving buy/sell ids from the taker's side.
    pub fn between(taker: &Order, maker: &Order, price: Price, quantity: Quantity) -> Self {
        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Buy => (taker.id, maker.id),
            Side::Sell => (maker.id, taker.id),
        };

        Self {
            symbol: taker.symbol.clone(),
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            taker_side: taker.side,
        }
    }
}

/// Represents a matched trade between two orders
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Unique trade identifier
    pub id: TradeId,

    /// Trading symbol
    pub symbol: Symbol,

    pub buy_order_id: OrderId,

    pub sell_order_id: OrderId,

    /// Execution price, always the resting order's price
    pub price: Price,

    /// Executed quantity
    pub quantity: Quantity,

    /// Side of the incoming (aggressive) order
    pub taker_side: Side,

    /// Execution timestamp
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    pub fn from_new(new: NewTrade, id: TradeId, executed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            symbol: new.symbol,
            buy_order_id: new.buy_order_id,
            sell_order_id: new.sell_order_id,
            price: new.price,
            quantity: new.quantity,
            taker_side: new.taker_side,
            executed_at,
        }
    }

    /// Order ID of the passive order (resting in book)
    pub fn maker_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.sell_order_id,
            Side::Sell => self.buy_order_id,
        }
    }

    /// Order ID of the aggressive order (incoming)
    pub fn taker_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.buy_order_id,
            Side::Sell => self.sell_order_id,
        }
    }

    pub fn involves(&self, order_id: OrderId) -> bool {
        self.buy_order_id == order_id || self.sell_order_id == order_id
    }

    /// Calculate the notional value of the trade (price * quantity)
    pub fn notional_value(&self) -> Decimal {
        self.price.value() * Decimal::from(self.quantity)
    }
}
