// ============================================================================
// Error Types
// ============================================================================

//! Error taxonomy for order submission, cancellation and lookups.
//!
//! Validation, not-found and invalid-state errors are raised before any state
//! changes. Persistence errors abort the surrounding transaction, so nothing
//! from the failed operation becomes visible and resubmitting is safe.

use crate::domain::{OrderId, OrderStatus};
use crate::numeric::{NumericError, Quantity};
use thiserror::Error;

/// Failures reported by a persistence gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("write conflict on order {order_id}: modified by a concurrent transaction")]
    Conflict { order_id: OrderId },

    #[error("order {order_id} does not exist")]
    MissingOrder { order_id: OrderId },

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Top-level error returned by exchange operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    #[error("order not found: {order_id}")]
    NotFound { order_id: OrderId },

    #[error("order {order_id} is {status} and cannot be changed")]
    InvalidState { order_id: OrderId, status: OrderStatus },

    #[error("fill of {requested} exceeds remaining {remaining} on order {order_id}")]
    Overfill {
        order_id: OrderId,
        requested: Quantity,
        remaining: Quantity,
    },

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl ExchangeError {
    pub fn validation(reason: impl Into<String>) -> Self {
        ExchangeError::Validation {
            reason: reason.into(),
        }
    }
}

impl From<NumericError> for ExchangeError {
    fn from(err: NumericError) -> Self {
        ExchangeError::validation(format!("invalid price: {}", err))
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;
