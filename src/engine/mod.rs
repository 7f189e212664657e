// ============================================================================
// Engine Module
// Matching, orchestration and per-symbol serialization
// ============================================================================

mod exchange;
mod price_time;
mod symbol_lock;

#[cfg(feature = "async")]
mod async_exchange;

pub mod factory;

#[cfg(feature = "async")]
pub use async_exchange::AsyncExchange;
pub use exchange::{Exchange, Submission};
pub use factory::{create_from_config, ExchangeBuilder};
pub use price_time::PriceTimePriority;
pub use symbol_lock::SymbolLocks;
