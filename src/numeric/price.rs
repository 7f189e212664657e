// ============================================================================
// Price
// Strictly positive decimal price
// ============================================================================

use super::errors::{NumericError, NumericResult};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A limit or execution price.
///
/// Wraps a [`Decimal`] that is guaranteed to be strictly positive, so a
/// `Price` value can never describe a zero or negative limit.
///
/// # Example
/// ```
/// use order_matching::numeric::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(9950, 2)).unwrap(); // 99.50
/// assert_eq!(price.to_string(), "99.50");
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Decimal", into = "Decimal"))]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative values.
    pub fn new(value: Decimal) -> NumericResult<Self> {
        if value <= Decimal::ZERO {
            return Err(NumericError::NonPositive);
        }
        Ok(Self(value))
    }

    /// Create a whole-unit price.
    pub fn from_integer(value: i64) -> NumericResult<Self> {
        Self::new(Decimal::from(value))
    }

    /// Underlying decimal value.
    #[inline]
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = NumericError;

    fn from_str(s: &str) -> NumericResult<Self> {
        let value = Decimal::from_str(s.trim()).map_err(|_| NumericError::InvalidInput)?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = NumericError;

    fn try_from(value: Decimal) -> NumericResult<Self> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_price() {
        let price = Price::from_integer(100).unwrap();
        assert_eq!(price.value(), Decimal::from(100));
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Price::new(Decimal::ZERO), Err(NumericError::NonPositive));
        assert_eq!(Price::from_integer(-5), Err(NumericError::NonPositive));
    }

    #[test]
    fn test_parse() {
        let price: Price = "99.25".parse().unwrap();
        assert_eq!(price.value(), Decimal::new(9925, 2));
        assert_eq!("abc".parse::<Price>(), Err(NumericError::InvalidInput));
        assert_eq!("-1".parse::<Price>(), Err(NumericError::NonPositive));
    }

    #[test]
    fn test_ordering_follows_decimal() {
        let low = Price::new(Decimal::new(4850, 2)).unwrap();
        let high = Price::from_integer(50).unwrap();
        assert!(low < high);
    }
}
