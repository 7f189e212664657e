// ============================================================================
// In-Memory Store
// Transactional persistence gateway backed by process memory
// ============================================================================

use crate::domain::{
    price_time_cmp, BookKey, NewOrder, NewTrade, Order, OrderId, Side, Symbol, Trade, TradeId,
};
use crate::error::StoreError;
use crate::interfaces::{OrderUpdate, PersistenceGateway, RestingQuery, Transaction};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Committed State
// ============================================================================

#[derive(Debug, Clone)]
struct OrderRow {
    order: Order,
    /// Bumped on every committed write, used for conflict detection
    version: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    orders: HashMap<OrderId, OrderRow>,
    /// Resting orders per book side, in price/time priority
    book: HashMap<(Symbol, Side), BTreeMap<BookKey, OrderId>>,
    trades: Vec<Trade>,
    trades_by_symbol: HashMap<Symbol, Vec<usize>>,
}

impl StoreState {
    fn upsert_order(&mut self, order: Order) {
        let book_side = (order.symbol.clone(), order.side);
        let key = BookKey::for_order(&order);

        let version = match self.orders.get(&order.id) {
            Some(row) => row.version + 1,
            None => 1,
        };

        if let Some(key) = key {
            let index = self.book.entry(book_side).or_default();
            if order.is_resting() {
                index.insert(key, order.id);
            } else {
                index.remove(&key);
            }
        }

        self.orders.insert(order.id, OrderRow { order, version });
    }

    fn push_trade(&mut self, trade: Trade) {
        let position = self.trades.len();
        self.trades_by_symbol
            .entry(trade.symbol.clone())
            .or_default()
            .push(position);
        self.trades.push(trade);
    }

    /// Committed resting orders for `query`, already in priority order.
    fn resting(&self, query: &RestingQuery) -> impl Iterator<Item = &Order> + '_ {
        let index = self.book.get(&(query.symbol.clone(), query.side));
        let query = query.clone();

        index
            .into_iter()
            .flat_map(|index| index.values())
            .filter_map(move |id| self.orders.get(id).map(|row| &row.order))
            .take_while(move |order| order.price().is_some_and(|p| query.accepts_price(p)))
    }

    fn resting_matching(&self, query: &RestingQuery) -> Vec<Order> {
        self.resting(query)
            .filter(|order| query.matches(order))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Persistence gateway keeping all orders and trades in memory.
///
/// Committed state lives behind a single `RwLock`. Transactions buffer their
/// writes and apply them in one critical section on commit, after checking
/// that no row they modified was changed by another committed transaction.
#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    sequence: AtomicU64,
    /// Last timestamp handed out; keeps creation and execution times strictly increasing
    clock: Mutex<DateTime<Utc>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            sequence: AtomicU64::new(0),
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Every committed order, oldest first.
    pub fn orders(&self) -> Vec<Order> {
        let state = self.state.read();
        let mut orders: Vec<Order> = state.orders.values().map(|row| row.order.clone()).collect();
        orders.sort_by_key(|order| order.sequence);
        orders
    }

    /// Every committed trade that references `order_id`, in execution order.
    pub fn trades_for_order(&self, order_id: OrderId) -> Vec<Trade> {
        self.state
            .read()
            .trades
            .iter()
            .filter(|trade| trade.involves(order_id))
            .cloned()
            .collect()
    }

    pub fn trade_count(&self) -> usize {
        self.state.read().trades.len()
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn now(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let next = if now > *last {
            now
        } else {
            *last + Duration::nanoseconds(1)
        };
        *last = next;
        next
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceGateway for InMemoryStore {
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, StoreError> {
        Ok(Box::new(MemoryTransaction::new(self)))
    }

    fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self
            .state
            .read()
            .orders
            .get(&order_id)
            .map(|row| row.order.clone()))
    }

    fn resting_orders(&self, query: &RestingQuery) -> Result<Vec<Order>, StoreError> {
        Ok(self.state.read().resting_matching(query))
    }

    fn book_sides(&self, symbol: &Symbol) -> Result<(Vec<Order>, Vec<Order>), StoreError> {
        let state = self.state.read();
        Ok((
            state.resting_matching(&RestingQuery::side(symbol.clone(), Side::Buy)),
            state.resting_matching(&RestingQuery::side(symbol.clone(), Side::Sell)),
        ))
    }

    fn recent_trades(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Trade>, StoreError> {
        let state = self.state.read();
        let mut trades: Vec<&Trade> = state
            .trades_by_symbol
            .get(symbol)
            .map(|positions| positions.iter().map(|&i| &state.trades[i]).collect())
            .unwrap_or_default();

        trades.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        Ok(trades.into_iter().take(limit).cloned().collect())
    }
}

// ============================================================================
// Transaction
// ============================================================================

#[derive(Debug)]
struct StagedOrder {
    order: Order,
    /// Committed version this write is based on; `None` for orders inserted
    /// by the transaction itself
    base_version: Option<u64>,
}

/// Write-buffering transaction over an [`InMemoryStore`]
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a InMemoryStore,
    staged: HashMap<OrderId, StagedOrder>,
    /// Versions of committed rows as first observed by this transaction
    read_versions: HashMap<OrderId, u64>,
    trades: Vec<Trade>,
}

impl<'a> MemoryTransaction<'a> {
    fn new(store: &'a InMemoryStore) -> Self {
        Self {
            store,
            staged: HashMap::new(),
            read_versions: HashMap::new(),
            trades: Vec::new(),
        }
    }

    fn observe(&mut self, row: &OrderRow) {
        self.read_versions
            .entry(row.order.id)
            .or_insert(row.version);
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        let sequence = self.store.next_sequence();
        let created_at = self.store.now();
        let order = Order::from_new(order, OrderId::new(), sequence, created_at);

        self.staged.insert(
            order.id,
            StagedOrder {
                order: order.clone(),
                base_version: None,
            },
        );
        Ok(order)
    }

    fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        if let Some(staged) = self.staged.get(&order_id) {
            return Ok(Some(staged.order.clone()));
        }

        let row = self.store.state.read().orders.get(&order_id).cloned();
        Ok(row.map(|row| {
            self.observe(&row);
            row.order
        }))
    }

    fn scan_resting(&mut self, query: &RestingQuery) -> Result<Vec<Order>, StoreError> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut observed = Vec::new();

        {
            let state = self.store.state.read();
            let index = state.book.get(&(query.symbol.clone(), query.side));
            for id in index.into_iter().flat_map(|index| index.values()) {
                let Some(row) = state.orders.get(id) else {
                    continue;
                };
                let order = match self.staged.get(id) {
                    Some(staged) => &staged.order,
                    None => &row.order,
                };
                if !order.price().is_some_and(|p| query.accepts_price(p)) {
                    break;
                }
                seen.insert(*id);
                observed.push((*id, row.version));
                if query.matches(order) {
                    candidates.push(order.clone());
                }
            }
        }

        for (id, version) in observed {
            self.read_versions.entry(id).or_insert(version);
        }

        // Orders written by this transaction that the committed index cannot know about
        candidates.extend(
            self.staged
                .values()
                .filter(|staged| !seen.contains(&staged.order.id) && query.matches(&staged.order))
                .map(|staged| staged.order.clone()),
        );

        candidates.sort_by(price_time_cmp);
        tracing::trace!(
            symbol = %query.symbol,
            side = %query.side,
            candidates = candidates.len(),
            "scanned resting orders"
        );
        Ok(candidates)
    }

    fn update_order(&mut self, update: OrderUpdate) -> Result<(), StoreError> {
        if let Some(staged) = self.staged.get_mut(&update.order_id) {
            staged
                .order
                .apply_update(update.remaining_quantity, update.status, update.updated_at);
            return Ok(());
        }

        let row = self
            .store
            .state
            .read()
            .orders
            .get(&update.order_id)
            .cloned()
            .ok_or(StoreError::MissingOrder {
                order_id: update.order_id,
            })?;
        self.observe(&row);

        let base_version = self.read_versions.get(&update.order_id).copied();
        let mut order = row.order;
        order.apply_update(update.remaining_quantity, update.status, update.updated_at);
        self.staged.insert(order.id, StagedOrder { order, base_version });
        Ok(())
    }

    fn insert_trade(&mut self, trade: NewTrade) -> Result<Trade, StoreError> {
        let trade = Trade::from_new(trade, TradeId::new(), self.store.now());
        self.trades.push(trade.clone());
        Ok(trade)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        let mut state = this.store.state.write();

        for (order_id, staged) in &this.staged {
            let Some(base_version) = staged.base_version else {
                continue;
            };
            match state.orders.get(order_id) {
                Some(row) if row.version == base_version => {},
                Some(_) => return Err(StoreError::Conflict { order_id: *order_id }),
                None => return Err(StoreError::MissingOrder { order_id: *order_id }),
            }
        }

        let (orders, trades) = (this.staged.len(), this.trades.len());
        for staged in this.staged.into_values() {
            state.upsert_order(staged.order);
        }
        for trade in this.trades {
            state.push_trade(trade);
        }

        tracing::trace!(orders, trades, "transaction committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        tracing::trace!(
            orders = self.staged.len(),
            trades = self.trades.len(),
            "transaction rolled back"
        );
    }
}
