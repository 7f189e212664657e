// ============================================================================
// Order Request
// Unvalidated order input as delivered by a transport
// ============================================================================

use super::{NewOrder, OrderKind, Side, Symbol};
use crate::error::{ExchangeError, ExchangeResult};
use crate::numeric::Price;
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Create-order command before validation.
///
/// `side` and `kind` are free-form strings here; [`OrderRequest::validate`]
/// turns the request into a typed [`NewOrder`] or rejects it without any
/// side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderRequest {
    pub symbol: String,
    pub side: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub price: Option<Decimal>,
    pub quantity: i64,
}

impl OrderRequest {
    pub fn limit(symbol: &str, side: &str, price: Decimal, quantity: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: side.to_string(),
            kind: "limit".to_string(),
            price: Some(price),
            quantity,
        }
    }

    pub fn market(symbol: &str, side: &str, quantity: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: side.to_string(),
            kind: "market".to_string(),
            price: None,
            quantity,
        }
    }

    /// Validate and normalize.
    ///
    /// A price sent with a market order is dropped.
    pub fn validate(&self, max_symbol_len: usize) -> ExchangeResult<NewOrder> {
        let side: Side = self.side.parse()?;

        let kind = match self.kind.as_str() {
            "limit" => {
                let price = self
                    .price
                    .and_then(|p| Price::new(p).ok())
                    .ok_or_else(|| ExchangeError::validation("limit orders must have a positive price"))?;
                OrderKind::Limit { price }
            },
            "market" => OrderKind::Market,
            _ => return Err(ExchangeError::validation("type must be 'limit' or 'market'")),
        };

        if self.quantity < 1 {
            return Err(ExchangeError::validation("quantity must be at least 1"));
        }

        let symbol = Symbol::parse(&self.symbol, max_symbol_len)?;

        Ok(NewOrder {
            symbol,
            side,
            kind,
            quantity: self.quantity as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::DEFAULT_MAX_SYMBOL_LEN;

    fn validate(request: &OrderRequest) -> ExchangeResult<NewOrder> {
        request.validate(DEFAULT_MAX_SYMBOL_LEN)
    }

    #[test]
    fn test_valid_limit_request() {
        let order = validate(&OrderRequest::limit("sym", "buy", Decimal::from(100), 10)).unwrap();

        assert_eq!(order.symbol.as_str(), "SYM");
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.kind.limit_price(), Some(Price::from_integer(100).unwrap()));
        assert_eq!(order.quantity, 10);
    }

    #[test]
    fn test_market_request_drops_price() {
        let mut request = OrderRequest::market("SYM", "sell", 20);
        request.price = Some(Decimal::from(42));

        let order = validate(&request).unwrap();
        assert_eq!(order.kind, OrderKind::Market);
    }

    #[test]
    fn test_rejections() {
        let bad_side = OrderRequest::limit("SYM", "hold", Decimal::from(1), 1);
        let bad_kind = OrderRequest {
            kind: "stop".to_string(),
            ..OrderRequest::market("SYM", "buy", 1)
        };
        let no_price = OrderRequest {
            price: None,
            ..OrderRequest::limit("SYM", "buy", Decimal::from(1), 1)
        };
        let zero_price = OrderRequest::limit("SYM", "buy", Decimal::ZERO, 1);
        let zero_quantity = OrderRequest::market("SYM", "buy", 0);
        let negative_quantity = OrderRequest::market("SYM", "buy", -3);
        let long_symbol = OrderRequest::market("ABCDEFGHIJK", "buy", 1);
        let empty_symbol = OrderRequest::market("", "buy", 1);

        for request in [
            bad_side,
            bad_kind,
            no_price,
            zero_price,
            zero_quantity,
            negative_quantity,
            long_symbol,
            empty_symbol,
        ] {
            let err = validate(&request).unwrap_err();
            assert!(
                matches!(err, ExchangeError::Validation { .. }),
                "expected validation error for {:?}, got {:?}",
                request,
                err
            );
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_wire_request() {
        let request: OrderRequest = serde_json::from_str(
            r#"{"symbol":"abc","side":"buy","type":"limit","price":"99.5","quantity":3}"#,
        )
        .unwrap();

        let order = validate(&request).unwrap();
        assert_eq!(order.kind.limit_price(), Some(Price::new(Decimal::new(995, 1)).unwrap()));

        let market: OrderRequest =
            serde_json::from_str(r#"{"symbol":"abc","side":"sell","type":"market","quantity":3}"#)
                .unwrap();
        assert_eq!(market.price, None);
    }
}
