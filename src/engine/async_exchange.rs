// ============================================================================
// Async Facade
// Runs exchange commands on the tokio blocking pool
// ============================================================================

use crate::domain::{Order, OrderBookSnapshot, OrderId, OrderRequest, Trade};
use crate::engine::{Exchange, Submission};
use crate::error::{ExchangeResult, StoreError};
use std::sync::Arc;

/// Cloneable async handle to an [`Exchange`].
///
/// Every command holds a symbol region and a store lock while it runs, so it
/// is moved off the async executor.
#[derive(Clone)]
pub struct AsyncExchange {
    inner: Arc<Exchange>,
}

impl AsyncExchange {
    pub fn new(exchange: Exchange) -> Self {
        Self::from_arc(Arc::new(exchange))
    }

    pub fn from_arc(inner: Arc<Exchange>) -> Self {
        Self { inner }
    }

    /// The wrapped synchronous exchange
    pub fn exchange(&self) -> &Arc<Exchange> {
        &self.inner
    }

    pub async fn submit(&self, request: OrderRequest) -> ExchangeResult<Submission> {
        self.run(move |exchange| exchange.submit(&request)).await
    }

    pub async fn get_order(&self, order_id: OrderId) -> ExchangeResult<Order> {
        self.run(move |exchange| exchange.get_order(order_id)).await
    }

    pub async fn cancel(&self, order_id: OrderId) -> ExchangeResult<Order> {
        self.run(move |exchange| exchange.cancel(order_id)).await
    }

    pub async fn order_book(&self, symbol: impl Into<String>) -> ExchangeResult<OrderBookSnapshot> {
        let symbol = symbol.into();
        self.run(move |exchange| exchange.order_book(&symbol)).await
    }

    pub async fn recent_trades(&self, symbol: impl Into<String>) -> ExchangeResult<Vec<Trade>> {
        let symbol = symbol.into();
        self.run(move |exchange| exchange.recent_trades(&symbol)).await
    }

    async fn run<T, F>(&self, command: F) -> ExchangeResult<T>
    where
        F: FnOnce(&Exchange) -> ExchangeResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let exchange = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || command(&exchange))
            .await
            .map_err(|err| StoreError::Unavailable {
                reason: format!("exchange task failed: {}", err),
            })?
    }
}
