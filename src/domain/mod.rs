// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod order;
pub mod order_book;
pub mod priority;
pub mod request;
pub mod symbol;
pub mod trade;

pub use config::{ExchangeConfig, MarketRemainder};
pub use order::{NewOrder, Order, OrderId, OrderKind, Side};
pub use order_book::{aggregate_levels, OrderBookLevel, OrderBookSnapshot, MAX_BOOK_DEPTH};
pub use priority::{crosses, price_time_cmp, BookKey};
pub use request::OrderRequest;
pub use symbol::Symbol;
pub use trade::{NewTrade, Trade, TradeId};

// Re-export state machine
pub use order::state::{OrderStatus, OrderStatusTransition};
