// ============================================================================
// Event Handler Interface
// Defines the contract for handling order and trade events
// ============================================================================

use crate::domain::{OrderId, Symbol, Trade};
use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the exchange.
///
/// Events are only emitted for committed state; a rolled-back submission
/// produces no events other than a possible `OrderRejected`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order validated and persisted
    OrderAccepted {
        order_id: OrderId,
        symbol: Symbol,
        timestamp: DateTime<Utc>,
    },

    /// Order rejected before persistence
    OrderRejected {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Incoming order crossed a resting order
    TradeExecuted {
        trade: Trade,
        timestamp: DateTime<Utc>,
    },

    /// Order partially filled
    OrderPartiallyFilled {
        order_id: OrderId,
        filled_quantity: Quantity,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order fully filled
    OrderFilled {
        order_id: OrderId,
        total_filled: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order canceled
    OrderCanceled {
        order_id: OrderId,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order resting in the book
    OrderAddedToBook {
        order_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing exchange events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!("Exchange event: {:?}", event);
    }
}
