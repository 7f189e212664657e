// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// Most common in traditional exchanges (NASDAQ, NYSE, etc.)
// ============================================================================

use crate::domain::{MarketRemainder, NewTrade, Order};
use crate::error::ExchangeResult;
use crate::interfaces::{Fills, MatchingAlgorithm, OrderUpdate, RestingQuery, Transaction};
use chrono::Utc;

/// Price/Time Priority (FIFO) matching algorithm
///
/// Resting orders are consumed best price first; orders at the same price
/// are consumed oldest first. Every execution happens at the resting order's
/// price.
///
/// # Example
/// ```text
/// Book:  99 x 5 (Order A, t=100)
///        99 x 5 (Order B, t=101)
///
/// Incoming: Buy 8 @ 100
/// Result: 5 with A @ 99, then 3 with B @ 99
/// ```
///
/// The candidate set is re-scanned after each pass until the incoming order
/// is filled or nothing crosses any more. A limit remainder then rests at its
/// current status. A market remainder is closed according to the configured
/// [`MarketRemainder`] policy.
pub struct PriceTimePriority {
    market_remainder: MarketRemainder,
}

impl PriceTimePriority {
    pub fn new(market_remainder: MarketRemainder) -> Self {
        Self { market_remainder }
    }

    fn close_unmatched(&self, tx: &mut dyn Transaction, incoming: &mut Order) -> ExchangeResult<()> {
        if !incoming.is_market_order() || incoming.get_remaining_quantity() == 0 {
            return Ok(());
        }

        let unmatched = incoming.get_remaining_quantity();
        match self.market_remainder {
            MarketRemainder::MarkFilled => incoming.discard_remainder(Utc::now())?,
            MarketRemainder::Cancel => incoming.cancel(Utc::now())?,
        }
        tx.update_order(OrderUpdate::from(&*incoming))?;

        tracing::debug!(
            order_id = %incoming.id,
            unmatched,
            policy = ?self.market_remainder,
            status = %incoming.get_status(),
            "market order ran out of liquidity"
        );
        Ok(())
    }
}

impl Default for PriceTimePriority {
    fn default() -> Self {
        Self::new(MarketRemainder::default())
    }
}

impl MatchingAlgorithm for PriceTimePriority {
    fn match_order(&self, tx: &mut dyn Transaction, incoming: &mut Order) -> ExchangeResult<Fills> {
        let mut trades = Fills::new();
        let query = RestingQuery::opposite_of(incoming);

        while incoming.get_remaining_quantity() > 0 {
            let candidates = tx.scan_resting(&query)?;
            let mut progressed = false;

            for mut maker in candidates {
                if incoming.get_remaining_quantity() == 0 {
                    break;
                }

                // The scan only yields priced resting orders that cross, but
                // a gateway returning anything else must not stall the loop
                let Some(price) = maker.price() else {
                    continue;
                };
                if !maker.is_resting() || !self.prices_cross(incoming, price) {
                    continue;
                }

                while incoming.get_remaining_quantity() > 0 && maker.get_remaining_quantity() > 0 {
                    let quantity = incoming
                        .get_remaining_quantity()
                        .min(maker.get_remaining_quantity());

                    let trade = tx.insert_trade(NewTrade::between(incoming, &maker, price, quantity))?;

                    incoming.apply_fill(quantity, trade.executed_at)?;
                    maker.apply_fill(quantity, trade.executed_at)?;
                    tx.update_order(OrderUpdate::from(&*incoming))?;
                    tx.update_order(OrderUpdate::from(&maker))?;

                    tracing::debug!(
                        trade_id = %trade.id,
                        taker = %incoming.id,
                        maker = %maker.id,
                        %price,
                        quantity,
                        "orders matched"
                    );
                    trades.push(trade);
                    progressed = true;
                }
            }

            if !progressed {
                self.close_unmatched(tx, incoming)?;
                break;
            }
        }

        Ok(trades)
    }

    fn name(&self) -> &str {
        "PriceTime"
    }
}
