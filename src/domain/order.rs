// ============================================================================
// Order Domain Model
// ============================================================================

use super::Symbol;
use crate::error::{ExchangeError, ExchangeResult};
use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use state::{OrderStatus, OrderStatusTransition};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for OrderId {
    type Err = ExchangeError;

    fn from_str(s: &str) -> ExchangeResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ExchangeError::validation("invalid order id format"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ExchangeError;

    fn from_str(s: &str) -> ExchangeResult<Self> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(ExchangeError::validation("side must be 'buy' or 'sell'")),
        }
    }
}

/// Order kind. A limit order always carries its price; a market order never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum OrderKind {
    Limit { price: Price },
    Market,
}

impl OrderKind {
    pub fn limit_price(&self) -> Option<Price> {
        match self {
            OrderKind::Limit { price } => Some(*price),
            OrderKind::Market => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Limit { .. } => "limit",
            OrderKind::Market => "market",
        }
    }
}

// ============================================================================
// Order State Machine
// ============================================================================

pub mod state {
    use crate::numeric::Quantity;
    use std::fmt;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
    pub enum OrderStatus {
        Open,
        PartiallyFilled,
        Filled,
        Canceled,
    }

    impl OrderStatus {
        /// Status implied by the quantities alone.
        pub fn for_quantities(remaining: Quantity, initial: Quantity) -> Self {
            if remaining == 0 {
                OrderStatus::Filled
            } else if remaining < initial {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Open
            }
        }

        pub fn is_terminal(&self) -> bool {
            matches!(self, OrderStatus::Filled | OrderStatus::Canceled)
        }

        /// Resting orders are eligible to be matched by incoming orders.
        pub fn is_resting(&self) -> bool {
            matches!(self, OrderStatus::Open | OrderStatus::PartiallyFilled)
        }

        pub fn can_be_canceled(&self) -> bool {
            self.is_resting()
        }

        pub fn as_str(&self) -> &'static str {
            match self {
                OrderStatus::Open => "open",
                OrderStatus::PartiallyFilled => "partially_filled",
                OrderStatus::Filled => "filled",
                OrderStatus::Canceled => "canceled",
            }
        }
    }

    impl fmt::Display for OrderStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Valid state transitions for the order state machine
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OrderStatusTransition {
        PartialFill,
        Fill,
        Cancel,
    }

    impl OrderStatus {
        pub fn transition(&self, transition: OrderStatusTransition) -> Result<OrderStatus, String> {
            match (self, transition) {
                (OrderStatus::Open, OrderStatusTransition::PartialFill)
                | (OrderStatus::PartiallyFilled, OrderStatusTransition::PartialFill) => {
                    Ok(OrderStatus::PartiallyFilled)
                },
                (OrderStatus::Open, OrderStatusTransition::Fill)
                | (OrderStatus::PartiallyFilled, OrderStatusTransition::Fill) => {
                    Ok(OrderStatus::Filled)
                },
                (OrderStatus::Open, OrderStatusTransition::Cancel)
                | (OrderStatus::PartiallyFilled, OrderStatusTransition::Cancel) => {
                    Ok(OrderStatus::Canceled)
                },

                _ => Err(format!(
                    "Invalid transition from {:?} via {:?}",
                    self, transition
                )),
            }
        }
    }
}

// ============================================================================
// Order Entities
// ============================================================================

/// A validated order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Quantity,
}

impl NewOrder {
    pub fn limit(symbol: Symbol, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            symbol,
            side,
            kind: OrderKind::Limit { price },
            quantity,
        }
    }

    pub fn market(symbol: Symbol, side: Side, quantity: Quantity) -> Self {
        Self {
            symbol,
            side,
            kind: OrderKind::Market,
            quantity,
        }
    }
}

/// A persisted order.
///
/// Identity, timestamps and the sequence number are assigned by the
/// persistence gateway on insert. Quantity and status only change through
/// [`Order::apply_fill`], [`Order::cancel`] and [`Order::discard_remainder`],
/// which keep `remaining <= initial` and the status consistent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: OrderKind,
    pub initial_quantity: Quantity,
    /// Store-assigned insertion sequence, breaks created_at ties
    pub sequence: u64,
    pub created_at: DateTime<Utc>,

    remaining_quantity: Quantity,
    status: OrderStatus,
    updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_new(new: NewOrder, id: OrderId, sequence: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            symbol: new.symbol,
            side: new.side,
            kind: new.kind,
            initial_quantity: new.quantity,
            sequence,
            created_at,
            remaining_quantity: new.quantity,
            status: OrderStatus::Open,
            updated_at: created_at,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn get_remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn get_filled_quantity(&self) -> Quantity {
        self.initial_quantity - self.remaining_quantity
    }

    pub fn get_status(&self) -> OrderStatus {
        self.status
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn price(&self) -> Option<Price> {
        self.kind.limit_price()
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.kind, OrderKind::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.kind, OrderKind::Limit { .. })
    }

    /// Open or partially filled with quantity left to match.
    pub fn is_resting(&self) -> bool {
        self.status.is_resting() && self.remaining_quantity > 0
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Consume `quantity` from the remaining size and advance the status.
    pub fn apply_fill(&mut self, quantity: Quantity, now: DateTime<Utc>) -> ExchangeResult<()> {
        if quantity == 0 || quantity > self.remaining_quantity {
            return Err(ExchangeError::Overfill {
                order_id: self.id,
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }

        let remaining = self.remaining_quantity - quantity;
        let transition = if remaining == 0 {
            OrderStatusTransition::Fill
        } else {
            OrderStatusTransition::PartialFill
        };
        self.status = self.advance(transition)?;
        self.remaining_quantity = remaining;
        self.touch(now);
        Ok(())
    }

    /// Transition to canceled. The remaining quantity is kept as-is.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> ExchangeResult<()> {
        self.status = self.advance(OrderStatusTransition::Cancel)?;
        self.touch(now);
        Ok(())
    }

    /// Close out an unmatched remainder by marking the order filled.
    ///
    /// The discarded quantity is not backed by any trade.
    pub fn discard_remainder(&mut self, now: DateTime<Utc>) -> ExchangeResult<()> {
        self.status = self.advance(OrderStatusTransition::Fill)?;
        self.remaining_quantity = 0;
        self.touch(now);
        Ok(())
    }

    /// Overwrite the mutable columns with a persisted update.
    pub fn apply_update(
        &mut self,
        remaining_quantity: Quantity,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) {
        debug_assert!(remaining_quantity <= self.initial_quantity);
        self.remaining_quantity = remaining_quantity;
        self.status = status;
        self.updated_at = updated_at;
    }

    fn advance(&self, transition: OrderStatusTransition) -> ExchangeResult<OrderStatus> {
        self.status
            .transition(transition)
            .map_err(|_| ExchangeError::InvalidState {
                order_id: self.id,
                status: self.status,
            })
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
