// ============================================================================
// Matching Algorithm Interface
// Defines the contract for pluggable matching algorithms
// ============================================================================

use crate::domain::{crosses, Order, Trade};
use crate::error::ExchangeResult;
use crate::interfaces::Transaction;
use crate::numeric::Price;
use smallvec::SmallVec;

/// Trades produced by one matching cycle. Most orders cross a handful of
/// resting orders at most.
pub type Fills = SmallVec<[Trade; 4]>;

/// Strategy pattern interface for matching algorithms
pub trait MatchingAlgorithm: Send + Sync {
    /// Match an incoming order against the opposite side of its book
    ///
    /// # Arguments
    /// * `tx` - The open transaction the whole cycle runs in
    /// * `incoming_order` - The freshly inserted order; updated in place
    ///
    /// # Returns
    /// Trades generated from matching, in execution order. On error the
    /// caller must roll the transaction back.
    fn match_order(&self, tx: &mut dyn Transaction, incoming_order: &mut Order)
        -> ExchangeResult<Fills>;

    /// Get the algorithm name for logging/metrics
    fn name(&self) -> &str;

    /// Optional: Check if the incoming order can trade at a resting price
    /// Default implementation handles buy/sell logic
    fn prices_cross(&self, incoming: &Order, book_price: Price) -> bool {
        crosses(incoming.side, incoming.price(), book_price)
    }
}
