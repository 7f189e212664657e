// ============================================================================
// Exchange Configuration
// Limits and matching behavior for the order matching service
// ============================================================================

use super::order_book::MAX_BOOK_DEPTH;
use super::symbol::DEFAULT_MAX_SYMBOL_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Market Remainder Policy
// ============================================================================

/// What happens to the part of a market order that found no liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MarketRemainder {
    /// The order is marked filled and its remaining quantity forced to zero.
    /// The discarded units are not backed by any trade.
    #[default]
    MarkFilled,

    /// The order is canceled and keeps its unfilled remaining quantity.
    Cancel,
}

// ============================================================================
// Complete Exchange Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExchangeConfig {
    /// Longest accepted symbol, in characters
    pub max_symbol_len: usize,

    /// Price levels reported per side of the order book view
    pub book_depth: usize,

    /// Number of trades returned by the recent trades view
    pub trade_history_limit: usize,

    /// Handling of unmatched market order quantity
    pub market_remainder: MarketRemainder,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
            book_depth: MAX_BOOK_DEPTH,
            trade_history_limit: 100,
            market_remainder: MarketRemainder::MarkFilled,
        }
    }
}

impl ExchangeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: Set maximum symbol length
    pub fn with_max_symbol_len(mut self, len: usize) -> Self {
        self.max_symbol_len = len;
        self
    }

    /// Builder method: Set order book depth
    pub fn with_book_depth(mut self, depth: usize) -> Self {
        self.book_depth = depth;
        self
    }

    /// Builder method: Set recent trades limit
    pub fn with_trade_history_limit(mut self, limit: usize) -> Self {
        self.trade_history_limit = limit;
        self
    }

    /// Builder method: Set market remainder policy
    pub fn with_market_remainder(mut self, policy: MarketRemainder) -> Self {
        self.market_remainder = policy;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_symbol_len == 0 {
            return Err("Maximum symbol length must be positive".to_string());
        }

        if self.book_depth == 0 || self.book_depth > MAX_BOOK_DEPTH {
            return Err(format!(
                "Book depth must be between 1 and {}",
                MAX_BOOK_DEPTH
            ));
        }

        if self.trade_history_limit == 0 {
            return Err("Trade history limit must be positive".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl ExchangeConfig {
    /// Unfilled market quantity is canceled instead of being marked filled
    pub fn cancel_unfilled_market_orders() -> Self {
        Self::default().with_market_remainder(MarketRemainder::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExchangeConfig::default();

        assert_eq!(config.max_symbol_len, 10);
        assert_eq!(config.book_depth, 10);
        assert_eq!(config.trade_history_limit, 100);
        assert_eq!(config.market_remainder, MarketRemainder::MarkFilled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ExchangeConfig::new()
            .with_book_depth(5)
            .with_trade_history_limit(20);

        assert_eq!(config.book_depth, 5);
        assert_eq!(config.trade_history_limit, 20);
    }

    #[test]
    fn test_validation() {
        assert!(ExchangeConfig::new().with_book_depth(0).validate().is_err());
        assert!(ExchangeConfig::new().with_book_depth(11).validate().is_err());
        assert!(ExchangeConfig::new().with_max_symbol_len(0).validate().is_err());
        assert!(ExchangeConfig::new()
            .with_trade_history_limit(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_preset_configs() {
        let config = ExchangeConfig::cancel_unfilled_market_orders();
        assert_eq!(config.market_remainder, MarketRemainder::Cancel);
        assert!(config.validate().is_ok());
    }
}
