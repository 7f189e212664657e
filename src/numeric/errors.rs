// ============================================================================
// Numeric Errors
// Error types for price construction
// ============================================================================

use thiserror::Error;

/// Errors that can occur while building prices.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Value must be strictly greater than zero
    #[error("value must be positive")]
    NonPositive,
    /// Input string or value is invalid
    #[error("invalid input: could not parse value")]
    InvalidInput,
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;
