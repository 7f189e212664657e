// ============================================================================
// Persistence Gateway Interface
// Defines the contract for durable order and trade storage
// ============================================================================

use crate::domain::{
    crosses, NewOrder, NewTrade, Order, OrderId, OrderStatus, Side, Symbol, Trade,
};
use crate::error::StoreError;
use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};

/// Filter for a scan of resting orders on one side of a symbol's book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingQuery {
    pub symbol: Symbol,
    /// Side of the resting orders being scanned
    pub side: Side,
    /// Worst acceptable resting price. Asks must be at or below it,
    /// bids at or above it. `None` accepts every price.
    pub price_bound: Option<Price>,
}

impl RestingQuery {
    /// Candidates an incoming order may trade against.
    pub fn opposite_of(incoming: &Order) -> Self {
        Self {
            symbol: incoming.symbol.clone(),
            side: incoming.side.opposite(),
            price_bound: incoming.price(),
        }
    }

    /// All resting orders of one side.
    pub fn side(symbol: Symbol, side: Side) -> Self {
        Self {
            symbol,
            side,
            price_bound: None,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        if order.symbol != self.symbol || order.side != self.side || !order.is_resting() {
            return false;
        }
        match order.price() {
            Some(price) => self.accepts_price(price),
            None => false,
        }
    }

    /// Whether a resting order at `price` is within the bound.
    pub fn accepts_price(&self, price: Price) -> bool {
        crosses(self.side.opposite(), self.price_bound, price)
    }
}

/// New values for the mutable columns of an order row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub order_id: OrderId,
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderUpdate {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            remaining_quantity: order.get_remaining_quantity(),
            status: order.get_status(),
            updated_at: order.get_updated_at(),
        }
    }
}

/// One atomic unit of work against the store.
///
/// Reads observe the transaction's own writes. Nothing becomes visible to
/// other readers before [`Transaction::commit`] succeeds; dropping a
/// transaction without committing discards every write.
pub trait Transaction {
    /// Persist a new order as open with its full quantity remaining.
    /// Assigns id, sequence and timestamps.
    fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError>;

    fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Resting orders matching `query`, in price/time priority.
    fn scan_resting(&mut self, query: &RestingQuery) -> Result<Vec<Order>, StoreError>;

    fn update_order(&mut self, update: OrderUpdate) -> Result<(), StoreError>;

    /// Append a trade. Assigns id and execution timestamp.
    fn insert_trade(&mut self, trade: NewTrade) -> Result<Trade, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>);
}

/// Durable owner of orders and trades
pub trait PersistenceGateway: Send + Sync {
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, StoreError>;

    /// Committed state of one order.
    fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Committed resting orders matching `query`, in price/time priority.
    fn resting_orders(&self, query: &RestingQuery) -> Result<Vec<Order>, StoreError>;

    /// Committed resting bids and asks of a symbol, in price/time priority.
    ///
    /// Gateways able to read both sides from one committed state should
    /// override this.
    fn book_sides(&self, symbol: &Symbol) -> Result<(Vec<Order>, Vec<Order>), StoreError> {
        let bids = self.resting_orders(&RestingQuery::side(symbol.clone(), Side::Buy))?;
        let asks = self.resting_orders(&RestingQuery::side(symbol.clone(), Side::Sell))?;
        Ok((bids, asks))
    }

    /// Most recent trades for a symbol, newest first.
    fn recent_trades(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Trade>, StoreError>;
}
