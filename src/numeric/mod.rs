// ============================================================================
// Numeric Module
// Price and quantity primitives for order matching
// ============================================================================
//
// This module provides:
// - Price: strictly positive decimal price, the only way a limit price exists
// - Quantity: whole-unit order and trade sizes
// - NumericError: Error types for price construction
//
// Design principles:
// - No floating-point operations
// - Invalid prices are unrepresentable once constructed
// - All fallible construction returns Result (no panics)

mod errors;
mod price;

pub use errors::{NumericError, NumericResult};
pub use price::Price;

/// Order and trade sizes are counted in whole units.
pub type Quantity = u64;
