// ============================================================================
// Basic Usage Example
// ============================================================================

use order_matching::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Prints trades and fills as they are committed
struct PrintingEventHandler;

impl EventHandler for PrintingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        match event {
            OrderEvent::TradeExecuted { trade, .. } => {
                println!(
                    "  Trade: {} @ {} (qty: {}, taker: {})",
                    trade.id, trade.price, trade.quantity, trade.taker_side
                );
            },
            OrderEvent::OrderFilled { order_id, total_filled, .. } => {
                println!("  Order {} filled ({})", order_id, total_filled);
            },
            OrderEvent::OrderRejected { reason, .. } => {
                println!("  Rejected: {}", reason);
            },
            _ => {},
        }
    }
}

fn print_book(book: &OrderBookSnapshot) {
    println!("\nBids:");
    for level in &book.bids {
        println!("  {} @ {} ({} orders)", level.total_quantity, level.price, level.order_count);
    }

    println!("\nAsks:");
    for level in &book.asks {
        println!("  {} @ {} ({} orders)", level.total_quantity, level.price, level.order_count);
    }

    println!("\nSpread: {:?}", book.spread());
    println!("Mid Price: {:?}", book.mid_price());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "logging")]
    order_matching::logging::init_logging(order_matching::logging::LogConfig::from_env())
        .map_err(|err| err.to_string())?;

    println!("=== Order Matching Example ===\n");

    let exchange = ExchangeBuilder::new()
        .with_event_handler(Arc::new(PrintingEventHandler))
        .build()?;

    // Add sell orders at different prices
    println!("Adding sell orders...");
    for i in 0i64..5 {
        exchange.submit(&OrderRequest::limit("btc", "sell", Decimal::from(50000 + i * 100), 1))?;
    }

    // Add buy orders
    println!("Adding buy orders...");
    for i in 0i64..5 {
        exchange.submit(&OrderRequest::limit("btc", "buy", Decimal::from(49900 - i * 100), 1))?;
    }

    println!("\n=== Order Book Snapshot ===");
    print_book(&exchange.order_book("BTC")?);

    // Crosses the first three ask levels, the last one partially
    println!("\n=== Submitting Crossing Limit Order ===");
    let submission = exchange.submit(&OrderRequest::limit("btc", "buy", Decimal::from(50200), 4))?;
    println!(
        "Order {} is {} with {} remaining",
        submission.order.id,
        submission.order.get_status(),
        submission.order.get_remaining_quantity()
    );

    // Sweeps the bids; nothing backs the unmatched remainder
    println!("\n=== Submitting Market Order ===");
    let market = exchange.submit(&OrderRequest::market("btc", "sell", 10))?;
    println!(
        "Market order {} traded {} units in {} trades",
        market.order.id,
        market.trades.iter().map(|t| t.quantity).sum::<u64>(),
        market.trades.len()
    );

    // Invalid requests are rejected before anything is stored
    println!("\n=== Submitting Invalid Order ===");
    if let Err(err) = exchange.submit(&OrderRequest::market("btc", "hold", 1)) {
        println!("Error: {}", err);
    }

    println!("\n=== Final Order Book ===");
    print_book(&exchange.order_book("BTC")?);

    println!("\n=== Recent Trades ===");
    for trade in exchange.recent_trades("BTC")? {
        println!("  {} {} @ {}", trade.executed_at, trade.quantity, trade.price);
    }

    Ok(())
}
