// ============================================================================
// Exchange Factory
// Creates exchanges with proper configuration
// ============================================================================

use crate::domain::{ExchangeConfig, MarketRemainder};
use crate::engine::{Exchange, PriceTimePriority};
use crate::interfaces::{EventHandler, MatchingAlgorithm, NoOpEventHandler, PersistenceGateway};
use crate::storage::InMemoryStore;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates an in-memory exchange from configuration
///
/// # Arguments
/// * `config` - Exchange configuration
/// * `event_handler` - Event handler for order and trade events
///
/// # Returns
/// * `Result<Exchange, String>` - Configured exchange or error
///
/// # Example
/// ```
/// use order_matching::prelude::*;
/// use order_matching::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let config = ExchangeConfig::cancel_unfilled_market_orders();
/// let exchange = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// ```
pub fn create_from_config(
    config: ExchangeConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<Exchange, String> {
    ExchangeBuilder::new()
        .with_config(config)
        .with_event_handler(event_handler)
        .build()
}

/// Creates the matching algorithm for a configuration
fn create_matching_algorithm(config: &ExchangeConfig) -> Box<dyn MatchingAlgorithm> {
    Box::new(PriceTimePriority::new(config.market_remainder))
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating exchanges with fluent API
///
/// Defaults to an [`InMemoryStore`] and a [`NoOpEventHandler`].
///
/// # Example
/// ```
/// use order_matching::prelude::*;
/// use std::sync::Arc;
///
/// let exchange = ExchangeBuilder::new()
///     .with_book_depth(5)
///     .with_market_remainder(MarketRemainder::Cancel)
///     .with_event_handler(Arc::new(LoggingEventHandler))
///     .build()
///     .unwrap();
/// assert_eq!(exchange.config().book_depth, 5);
/// ```
#[derive(Default)]
pub struct ExchangeBuilder {
    config: ExchangeConfig,
    store: Option<Arc<dyn PersistenceGateway>>,
    event_handler: Option<Arc<dyn EventHandler>>,
    algorithm: Option<Box<dyn MatchingAlgorithm>>,
}

impl ExchangeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Use a specific persistence gateway
    pub fn with_store(mut self, store: Arc<dyn PersistenceGateway>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(event_handler);
        self
    }

    /// Override the algorithm derived from the configuration
    pub fn with_algorithm(mut self, algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    // ========================================================================
    // Limits and Policies
    // ========================================================================

    pub fn with_max_symbol_len(mut self, len: usize) -> Self {
        self.config.max_symbol_len = len;
        self
    }

    pub fn with_book_depth(mut self, depth: usize) -> Self {
        self.config.book_depth = depth;
        self
    }

    pub fn with_trade_history_limit(mut self, limit: usize) -> Self {
        self.config.trade_history_limit = limit;
        self
    }

    pub fn with_market_remainder(mut self, policy: MarketRemainder) -> Self {
        self.config.market_remainder = policy;
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Validate the configuration and assemble the exchange
    pub fn build(self) -> Result<Exchange, String> {
        self.config.validate()?;

        let algorithm = match self.algorithm {
            Some(algorithm) => algorithm,
            None => create_matching_algorithm(&self.config),
        };
        let store: Arc<dyn PersistenceGateway> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryStore::new()),
        };
        let event_handler: Arc<dyn EventHandler> = match self.event_handler {
            Some(handler) => handler,
            None => Arc::new(NoOpEventHandler),
        };

        tracing::debug!(
            algorithm = algorithm.name(),
            config = ?self.config,
            "building exchange"
        );

        Ok(Exchange::new(store, algorithm, event_handler, self.config))
    }
}
