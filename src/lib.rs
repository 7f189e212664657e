// ============================================================================
// Order Matching Library
// Transactional price/time priority matching over a pluggable store
// ============================================================================

//! # Order Matching
//!
//! A continuous limit order book matching service for multiple symbols.
//!
//! ## Features
//!
//! - **Limit and market orders** matched by price/time priority at the
//!   resting order's price
//! - **Transactional cycles**: an order, its fills and its trades commit
//!   together or not at all
//! - **Per-symbol serialization**: one matching cycle per symbol at a time,
//!   symbols proceed in parallel
//! - **Pluggable persistence** through the [`interfaces::PersistenceGateway`]
//!   trait, with an in-memory implementation bundled
//! - **Event hooks** for committed state changes
//!
//! ## Example
//!
//! ```rust
//! use order_matching::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let exchange = ExchangeBuilder::new().build().unwrap();
//!
//! // Rest an ask, then cross it
//! exchange
//!     .submit(&OrderRequest::limit("btc", "sell", Decimal::from(99), 5))
//!     .unwrap();
//! let submission = exchange
//!     .submit(&OrderRequest::limit("btc", "buy", Decimal::from(100), 10))
//!     .unwrap();
//!
//! assert_eq!(submission.trades.len(), 1);
//! assert_eq!(submission.order.get_status(), OrderStatus::PartiallyFilled);
//!
//! // Depth view
//! let book = exchange.order_book("BTC").unwrap();
//! println!("Best bid: {:?}", book.best_bid());
//! println!("Best ask: {:?}", book.best_ask());
//! println!("Spread: {:?}", book.spread());
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod numeric;
pub mod storage;

#[cfg(feature = "logging")]
pub mod logging;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        ExchangeConfig, MarketRemainder, NewOrder, Order, OrderBookLevel, OrderBookSnapshot,
        OrderId, OrderKind, OrderRequest, OrderStatus, Side, Symbol, Trade, TradeId,
    };
    #[cfg(feature = "async")]
    pub use crate::engine::AsyncExchange;
    pub use crate::engine::{
        create_from_config, Exchange, ExchangeBuilder, PriceTimePriority, Submission,
    };
    pub use crate::error::{ExchangeError, ExchangeResult, StoreError};
    pub use crate::interfaces::{
        EventHandler, LoggingEventHandler, MatchingAlgorithm, NoOpEventHandler, OrderEvent,
        PersistenceGateway, Transaction,
    };
    pub use crate::numeric::{Price, Quantity};
    pub use crate::storage::InMemoryStore;
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use crate::interfaces::{RecordingEventHandler, RestingQuery};
    use rust_decimal::Decimal;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn setup(policy: MarketRemainder) -> (Exchange, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let exchange = ExchangeBuilder::new()
            .with_store(store.clone())
            .with_market_remainder(policy)
            .build()
            .unwrap();
        (exchange, store)
    }

    fn limit(symbol: &str, side: &str, price: i64, quantity: i64) -> OrderRequest {
        OrderRequest::limit(symbol, side, Decimal::from(price), quantity)
    }

    fn price(value: i64) -> Price {
        Price::from_integer(value).unwrap()
    }

    fn traded(store: &InMemoryStore, order_id: OrderId) -> u64 {
        store
            .trades_for_order(order_id)
            .iter()
            .map(|trade| trade.quantity)
            .sum()
    }

    // ------------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------------

    #[test]
    fn test_limit_rests_without_liquidity() {
        let (exchange, _) = setup(MarketRemainder::MarkFilled);

        let submission = exchange.submit(&limit("sym", "buy", 100, 10)).unwrap();

        assert!(submission.trades.is_empty());
        assert_eq!(submission.order.get_status(), OrderStatus::Open);
        assert_eq!(submission.order.get_remaining_quantity(), 10);

        let book = exchange.order_book("SYM").unwrap();
        assert_eq!(book.best_bid(), Some(price(100)));
        assert_eq!(book.bids[0].total_quantity, 10);
        assert!(book.asks.is_empty());
    }

    #[test]
    fn test_limit_crosses_at_resting_price() {
        let (exchange, _) = setup(MarketRemainder::MarkFilled);
        let ask = exchange.submit(&limit("sym", "sell", 99, 5)).unwrap().order;

        let submission = exchange.submit(&limit("sym", "buy", 100, 10)).unwrap();

        assert_eq!(submission.trades.len(), 1);
        let trade = &submission.trades[0];
        assert_eq!(trade.price, price(99));
        assert_eq!(trade.quantity, 5);
        assert_eq!(trade.buy_order_id, submission.order.id);
        assert_eq!(trade.sell_order_id, ask.id);
        assert_eq!(trade.taker_side, Side::Buy);

        assert_eq!(submission.order.get_remaining_quantity(), 5);
        assert_eq!(submission.order.get_status(), OrderStatus::PartiallyFilled);

        let ask = exchange.get_order(ask.id).unwrap();
        assert_eq!(ask.get_remaining_quantity(), 0);
        assert_eq!(ask.get_status(), OrderStatus::Filled);

        // The remainder now rests as the best bid
        let book = exchange.order_book("sym").unwrap();
        assert_eq!(book.best_bid(), Some(price(100)));
        assert!(book.asks.is_empty());
    }

    #[test]
    fn test_market_sell_sweeps_bids_and_discards_remainder() {
        let (exchange, store) = setup(MarketRemainder::MarkFilled);
        let best = exchange.submit(&limit("sym", "buy", 50, 8)).unwrap().order;
        let next = exchange.submit(&limit("sym", "buy", 48, 5)).unwrap().order;

        let submission = exchange
            .submit(&OrderRequest::market("sym", "sell", 20))
            .unwrap();

        let fills: Vec<_> = submission
            .trades
            .iter()
            .map(|t| (t.price, t.quantity, t.buy_order_id))
            .collect();
        assert_eq!(fills, vec![(price(50), 8, best.id), (price(48), 5, next.id)]);

        let sell = exchange.get_order(submission.order.id).unwrap();
        assert_eq!(sell.get_status(), OrderStatus::Filled);
        assert_eq!(sell.get_remaining_quantity(), 0);
        // 7 units are not backed by any trade
        assert_eq!(traded(&store, sell.id), 13);
        assert_eq!(sell.initial_quantity - traded(&store, sell.id), 7);
    }

    #[test]
    fn test_market_remainder_cancel_policy() {
        let (exchange, store) = setup(MarketRemainder::Cancel);
        exchange.submit(&limit("sym", "buy", 50, 8)).unwrap();
        exchange.submit(&limit("sym", "buy", 48, 5)).unwrap();

        let submission = exchange
            .submit(&OrderRequest::market("sym", "sell", 20))
            .unwrap();

        let sell = exchange.get_order(submission.order.id).unwrap();
        assert_eq!(sell.get_status(), OrderStatus::Canceled);
        assert_eq!(sell.get_remaining_quantity(), 7);
        assert_eq!(traded(&store, sell.id), sell.get_filled_quantity());
    }

    #[test]
    fn test_cancel_filled_order_leaves_it_unchanged() {
        let (exchange, _) = setup(MarketRemainder::MarkFilled);
        let ask = exchange.submit(&limit("sym", "sell", 10, 2)).unwrap().order;
        exchange.submit(&limit("sym", "buy", 10, 2)).unwrap();
        let before = exchange.get_order(ask.id).unwrap();

        let result = exchange.cancel(ask.id);

        assert!(matches!(
            result,
            Err(ExchangeError::InvalidState { status: OrderStatus::Filled, .. })
        ));
        assert_eq!(exchange.get_order(ask.id).unwrap(), before);
    }

    #[test]
    fn test_canceled_order_never_scanned() {
        let (exchange, store) = setup(MarketRemainder::MarkFilled);
        let ask = exchange.submit(&limit("sym", "sell", 10, 2)).unwrap().order;
        exchange.cancel(ask.id).unwrap();

        let mut tx = store.begin().unwrap();
        let candidates = tx
            .scan_resting(&RestingQuery::side(Symbol::new("SYM").unwrap(), Side::Sell))
            .unwrap();
        tx.rollback();
        assert!(candidates.is_empty());

        // And nothing trades against it
        let buy = exchange
            .submit(&OrderRequest::market("sym", "buy", 2))
            .unwrap();
        assert!(buy.trades.is_empty());
    }

    #[test]
    fn test_time_priority_within_price_level() {
        let (exchange, _) = setup(MarketRemainder::MarkFilled);
        let first = exchange.submit(&limit("sym", "sell", 10, 3)).unwrap().order;
        let second = exchange.submit(&limit("sym", "sell", 10, 3)).unwrap().order;

        let submission = exchange.submit(&limit("sym", "buy", 10, 4)).unwrap();

        let makers: Vec<_> = submission
            .trades
            .iter()
            .map(|t| (t.sell_order_id, t.quantity))
            .collect();
        assert_eq!(makers, vec![(first.id, 3), (second.id, 1)]);
    }

    #[test]
    fn test_symbols_are_isolated() {
        let (exchange, _) = setup(MarketRemainder::MarkFilled);
        exchange.submit(&limit("aaa", "sell", 10, 3)).unwrap();

        let submission = exchange.submit(&limit("bbb", "buy", 20, 3)).unwrap();

        assert!(submission.trades.is_empty());
        assert!(exchange.recent_trades("aaa").unwrap().is_empty());
        assert_eq!(exchange.order_book("aaa").unwrap().asks.len(), 1);
    }

    #[test]
    fn test_event_flow_for_full_fill() {
        let handler = Arc::new(RecordingEventHandler::default());
        let exchange = ExchangeBuilder::new()
            .with_event_handler(handler.clone())
            .build()
            .unwrap();

        exchange.submit(&limit("sym", "sell", 10, 3)).unwrap();
        exchange.submit(&limit("sym", "buy", 11, 3)).unwrap();

        let events = handler.events();
        assert!(matches!(
            events.as_slice(),
            [
                OrderEvent::OrderAccepted { .. },
                OrderEvent::OrderAddedToBook { quantity: 3, .. },
                OrderEvent::OrderAccepted { .. },
                OrderEvent::TradeExecuted { .. },
                OrderEvent::OrderFilled { total_filled: 3, .. },
            ]
        ));
    }

    // ------------------------------------------------------------------------
    // Concurrency
    // ------------------------------------------------------------------------

    #[test]
    fn test_concurrent_takers_never_overfill_maker() {
        let (exchange, store) = setup(MarketRemainder::Cancel);
        let exchange = Arc::new(exchange);
        let ask = exchange.submit(&limit("sym", "sell", 10, 100)).unwrap().order;

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let exchange = Arc::clone(&exchange);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..5 {
                        exchange
                            .submit(&OrderRequest::market("sym", "buy", 3))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // 8 * 5 * 3 = 120 requested against 100 available
        let ask = exchange.get_order(ask.id).unwrap();
        assert_eq!(ask.get_status(), OrderStatus::Filled);
        assert_eq!(traded(&store, ask.id), 100);
        assert_eq!(store.trades_for_order(ask.id).len(), store.trade_count());

        for order in store.orders() {
            assert_eq!(traded(&store, order.id), order.get_filled_quantity());
        }
    }

    #[test]
    fn test_parallel_symbols() {
        let (exchange, store) = setup(MarketRemainder::MarkFilled);
        let exchange = Arc::new(exchange);

        let handles: Vec<_> = ["aaa", "bbb", "ccc", "ddd"]
            .into_iter()
            .map(|symbol| {
                let exchange = Arc::clone(&exchange);
                thread::spawn(move || {
                    for i in 0..20 {
                        exchange.submit(&limit(symbol, "sell", 100 + i, 1)).unwrap();
                        exchange.submit(&limit(symbol, "buy", 200, 1)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.trade_count(), 80);
        for symbol in ["AAA", "BBB", "CCC", "DDD"] {
            let book = exchange.order_book(symbol).unwrap();
            assert!(book.bids.is_empty());
            assert!(book.asks.is_empty());
        }
    }

    #[test]
    fn test_cancel_racing_fill() {
        for _ in 0..50 {
            let (exchange, store) = setup(MarketRemainder::MarkFilled);
            let exchange = Arc::new(exchange);
            let ask = exchange.submit(&limit("sym", "sell", 10, 5)).unwrap().order;
            let barrier = Arc::new(Barrier::new(2));

            let canceller = {
                let exchange = Arc::clone(&exchange);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    exchange.cancel(ask.id)
                })
            };
            let taker = {
                let exchange = Arc::clone(&exchange);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    exchange.submit(&limit("sym", "buy", 10, 5)).unwrap()
                })
            };

            let cancel = canceller.join().unwrap();
            let buy = taker.join().unwrap();
            let ask = exchange.get_order(ask.id).unwrap();

            match cancel {
                Ok(canceled) => {
                    assert_eq!(canceled.get_status(), OrderStatus::Canceled);
                    assert_eq!(ask.get_status(), OrderStatus::Canceled);
                    assert_eq!(ask.get_remaining_quantity(), 5);
                    assert!(buy.trades.is_empty());
                    assert_eq!(store.trade_count(), 0);
                },
                Err(err) => {
                    assert!(matches!(
                        err,
                        ExchangeError::InvalidState { status: OrderStatus::Filled, .. }
                    ));
                    assert_eq!(ask.get_status(), OrderStatus::Filled);
                    assert_eq!(buy.trades.len(), 1);
                    assert_eq!(traded(&store, ask.id), 5);
                },
            }
        }
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        #[derive(Debug, Clone)]
        enum Step {
            Limit { buy: bool, price: i64, quantity: i64 },
            Market { buy: bool, quantity: i64 },
            Cancel { pick: usize },
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                4 => (any::<bool>(), 95i64..=105, 1i64..=20)
                    .prop_map(|(buy, price, quantity)| Step::Limit { buy, price, quantity }),
                2 => (any::<bool>(), 1i64..=30)
                    .prop_map(|(buy, quantity)| Step::Market { buy, quantity }),
                1 => any::<usize>().prop_map(|pick| Step::Cancel { pick }),
            ]
        }

        fn side(buy: bool) -> &'static str {
            if buy {
                "buy"
            } else {
                "sell"
            }
        }

        fn run(exchange: &Exchange, store: &InMemoryStore, steps: &[Step]) -> Result<(), TestCaseError> {
            let mut terminal: HashMap<OrderId, Order> = HashMap::new();

            for step in steps {
                match step {
                    Step::Limit { buy, price, quantity } => {
                        let submission = exchange
                            .submit(&limit("sym", side(*buy), *price, *quantity))
                            .unwrap();
                        check_trades(&submission)?;
                    },
                    Step::Market { buy, quantity } => {
                        let submission = exchange
                            .submit(&OrderRequest::market("sym", side(*buy), *quantity))
                            .unwrap();
                        check_trades(&submission)?;
                    },
                    Step::Cancel { pick } => {
                        let orders = store.orders();
                        let target = &orders[pick % orders.len().max(1)..];
                        if let Some(order) = target.first() {
                            let result = exchange.cancel(order.id);
                            prop_assert_eq!(result.is_ok(), order.get_status().can_be_canceled());
                        }
                    },
                }

                for order in store.orders() {
                    let remaining = order.get_remaining_quantity();
                    prop_assert!(remaining <= order.initial_quantity);
                    prop_assert_eq!(
                        order.get_status() == OrderStatus::Filled,
                        remaining == 0 && order.get_status() != OrderStatus::Canceled
                    );

                    if let Some(before) = terminal.get(&order.id) {
                        prop_assert_eq!(before, &order);
                    } else if order.get_status().is_terminal() {
                        terminal.insert(order.id, order.clone());
                    }
                }

                let book = exchange.order_book("sym").unwrap();
                if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
                    prop_assert!(bid < ask, "book left crossed: {} >= {}", bid, ask);
                }
            }
            Ok(())
        }

        fn check_trades(submission: &Submission) -> Result<(), TestCaseError> {
            let incoming = &submission.order;
            for pair in submission.trades.windows(2) {
                // Price priority: the incoming order never gets a worse price later
                match incoming.side {
                    Side::Buy => prop_assert!(pair[0].price <= pair[1].price),
                    Side::Sell => prop_assert!(pair[0].price >= pair[1].price),
                }
            }
            for trade in &submission.trades {
                prop_assert_eq!(trade.taker_order_id(), incoming.id);
                if let Some(limit) = incoming.price() {
                    match incoming.side {
                        Side::Buy => prop_assert!(trade.price <= limit),
                        Side::Sell => prop_assert!(trade.price >= limit),
                    }
                }
            }
            Ok(())
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_invariants_hold_with_cancel_policy(steps in prop::collection::vec(step(), 1..40)) {
                let (exchange, store) = setup(MarketRemainder::Cancel);
                run(&exchange, &store, &steps)?;

                // Every unit that left an order is backed by a trade
                for order in store.orders() {
                    prop_assert_eq!(traded(&store, order.id), order.get_filled_quantity());
                }
            }

            #[test]
            fn prop_invariants_hold_with_mark_filled_policy(steps in prop::collection::vec(step(), 1..40)) {
                let (exchange, store) = setup(MarketRemainder::MarkFilled);
                run(&exchange, &store, &steps)?;

                for order in store.orders() {
                    let traded = traded(&store, order.id);
                    if order.is_limit_order() {
                        prop_assert_eq!(traded, order.get_filled_quantity());
                    } else {
                        // Discarded market quantity has no trade behind it
                        prop_assert!(traded <= order.get_filled_quantity());
                    }
                }
            }

            #[test]
            fn prop_trades_execute_at_resting_price(
                asks in prop::collection::vec((95i64..=105, 1i64..=10), 1..10),
                limit_price in 95i64..=105,
                quantity in 1i64..=60,
            ) {
                let (exchange, store) = setup(MarketRemainder::MarkFilled);
                for (price, quantity) in &asks {
                    exchange.submit(&limit("sym", "sell", *price, *quantity)).unwrap();
                }

                let submission = exchange.submit(&limit("sym", "buy", limit_price, quantity)).unwrap();

                for trade in &submission.trades {
                    let maker = store.get_order(trade.maker_order_id()).unwrap().unwrap();
                    prop_assert_eq!(Some(trade.price), maker.price());
                }
                let crossing: i64 = asks
                    .iter()
                    .filter(|(price, _)| *price <= limit_price)
                    .map(|(_, quantity)| *quantity)
                    .sum();
                let filled: u64 = submission.trades.iter().map(|t| t.quantity).sum();
                prop_assert_eq!(filled, crossing.min(quantity) as u64);
            }
        }
    }
}
