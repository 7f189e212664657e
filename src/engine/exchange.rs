// ============================================================================
// Exchange
// Validates, persists and matches orders; serves book and trade views
// ============================================================================

use crate::domain::{
    aggregate_levels, ExchangeConfig, NewOrder, Order, OrderBookSnapshot, OrderId, OrderRequest,
    OrderStatus, Side, Symbol, Trade,
};
use crate::engine::SymbolLocks;
use crate::error::{ExchangeError, ExchangeResult};
use crate::interfaces::{
    EventHandler, MatchingAlgorithm, OrderEvent, OrderUpdate, PersistenceGateway, Transaction,
};
use chrono::Utc;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a successful submission: the order as committed and the trades
/// it produced, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Submission {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Order matching service over a persistence gateway
pub struct Exchange {
    /// Durable owner of orders and trades
    store: Arc<dyn PersistenceGateway>,

    /// Pluggable matching algorithm
    algorithm: Box<dyn MatchingAlgorithm>,

    /// Event handler for committed state changes
    event_handler: Arc<dyn EventHandler>,

    /// Serializes cycles per symbol
    symbol_locks: SymbolLocks,

    config: ExchangeConfig,
}

impl Exchange {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        algorithm: Box<dyn MatchingAlgorithm>,
        event_handler: Arc<dyn EventHandler>,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            store,
            algorithm,
            event_handler,
            symbol_locks: SymbolLocks::new(),
            config,
        }
    }

    /// Validate a raw request, then persist and match it.
    ///
    /// Validation failures are reported before anything is persisted.
    pub fn submit(&self, request: &OrderRequest) -> ExchangeResult<Submission> {
        let order = request
            .validate(self.config.max_symbol_len)
            .map_err(|err| self.reject(&request.symbol, err))?;

        self.submit_order(order)
    }

    /// Persist and match a validated order in one transaction.
    ///
    /// Any failure rolls the whole cycle back: neither the order nor any
    /// trade or fill becomes visible.
    pub fn submit_order(&self, order: NewOrder) -> ExchangeResult<Submission> {
        if order.quantity == 0 {
            let err = ExchangeError::validation("quantity must be at least 1");
            return Err(self.reject(order.symbol.as_str(), err));
        }

        let symbol = order.symbol.clone();
        let (order, trades) = self.symbol_locks.with_symbol(&symbol, || {
            self.in_transaction(|tx| {
                let mut order = tx.insert_order(order)?;
                let trades = self.algorithm.match_order(tx, &mut order)?;
                Ok((order, trades))
            })
        })?;

        tracing::info!(
            order_id = %order.id,
            %symbol,
            side = %order.side,
            kind = order.kind.as_str(),
            status = %order.get_status(),
            trades = trades.len(),
            "order accepted"
        );

        let trades = trades.into_vec();
        self.publish_submission(&order, &trades);

        Ok(Submission { order, trades })
    }

    /// Committed state of an order
    pub fn get_order(&self, order_id: OrderId) -> ExchangeResult<Order> {
        self.store
            .get_order(order_id)?
            .ok_or(ExchangeError::NotFound { order_id })
    }

    /// Cancel an open or partially filled order.
    ///
    /// The status is re-checked inside the cycle, so a cancel racing a fill
    /// to completion fails with `InvalidState`.
    pub fn cancel(&self, order_id: OrderId) -> ExchangeResult<Order> {
        let symbol = self.get_order(order_id)?.symbol;

        let order = self.symbol_locks.with_symbol(&symbol, || {
            self.in_transaction(|tx| {
                let mut order = tx
                    .get_order(order_id)?
                    .ok_or(ExchangeError::NotFound { order_id })?;
                order.cancel(Utc::now())?;
                tx.update_order(OrderUpdate::from(&order))?;
                Ok(order)
            })
        })?;

        tracing::info!(
            %order_id,
            %symbol,
            remaining = order.get_remaining_quantity(),
            "order canceled"
        );
        self.event_handler.on_event(OrderEvent::OrderCanceled {
            order_id,
            remaining_quantity: order.get_remaining_quantity(),
            timestamp: Utc::now(),
        });

        Ok(order)
    }

    /// Aggregated depth of a symbol's book, computed from committed state
    pub fn order_book(&self, symbol: &str) -> ExchangeResult<OrderBookSnapshot> {
        let symbol = Symbol::parse(symbol, self.config.max_symbol_len)?;

        // Read-only: no symbol region, so unseen symbols leave no trace
        let (bids, asks) = self.store.book_sides(&symbol)?;

        let depth = self.config.book_depth;
        Ok(OrderBookSnapshot::with_depth(
            symbol,
            aggregate_levels(Side::Buy, &bids, depth),
            aggregate_levels(Side::Sell, &asks, depth),
        ))
    }

    /// Most recent trades of a symbol, newest first
    pub fn recent_trades(&self, symbol: &str) -> ExchangeResult<Vec<Trade>> {
        let symbol = Symbol::parse(symbol, self.config.max_symbol_len)?;
        Ok(self
            .store
            .recent_trades(&symbol, self.config.trade_history_limit)?)
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Name of the configured matching algorithm
    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    /// Run `work` in a fresh transaction: commit on success, roll back on
    /// any error.
    fn in_transaction<T>(
        &self,
        work: impl FnOnce(&mut dyn Transaction) -> ExchangeResult<T>,
    ) -> ExchangeResult<T> {
        let mut tx = self.store.begin()?;

        match work(&mut *tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            },
            Err(err) => {
                tracing::warn!(error = %err, "rolling back transaction");
                tx.rollback();
                Err(err)
            },
        }
    }

    /// Report a validation failure; nothing has been persisted.
    fn reject(&self, symbol: &str, err: ExchangeError) -> ExchangeError {
        tracing::warn!(%symbol, error = %err, "order rejected");
        self.event_handler.on_event(OrderEvent::OrderRejected {
            reason: err.to_string(),
            timestamp: Utc::now(),
        });
        err
    }

    fn publish_submission(&self, order: &Order, trades: &[Trade]) {
        let timestamp = Utc::now();
        let mut events = Vec::with_capacity(trades.len() + 3);

        events.push(OrderEvent::OrderAccepted {
            order_id: order.id,
            symbol: order.symbol.clone(),
            timestamp,
        });

        for trade in trades {
            events.push(OrderEvent::TradeExecuted {
                trade: trade.clone(),
                timestamp,
            });
        }

        let remaining = order.get_remaining_quantity();
        match order.get_status() {
            OrderStatus::Filled => events.push(OrderEvent::OrderFilled {
                order_id: order.id,
                total_filled: order.get_filled_quantity(),
                timestamp,
            }),
            OrderStatus::PartiallyFilled => events.push(OrderEvent::OrderPartiallyFilled {
                order_id: order.id,
                filled_quantity: order.get_filled_quantity(),
                remaining_quantity: remaining,
                timestamp,
            }),
            OrderStatus::Canceled => events.push(OrderEvent::OrderCanceled {
                order_id: order.id,
                remaining_quantity: remaining,
                timestamp,
            }),
            OrderStatus::Open => {},
        }

        if let (true, Some(price)) = (order.is_resting(), order.price()) {
            events.push(OrderEvent::OrderAddedToBook {
                order_id: order.id,
                price,
                quantity: remaining,
                timestamp,
            });
        }

        self.event_handler.on_events(events);
    }
}
