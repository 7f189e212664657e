// ============================================================================
// Per-Symbol Exclusive Regions
// One matching or cancellation cycle per symbol at a time
// ============================================================================

use crate::domain::Symbol;
use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Registry of per-symbol mutexes.
///
/// Cycles on different symbols never contend. Regions are created lazily on
/// first use and live as long as the registry.
#[derive(Default)]
pub struct SymbolLocks {
    regions: SkipMap<Symbol, Arc<Mutex<()>>>,
}

impl SymbolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The region guarding `symbol`, created if missing.
    pub fn region(&self, symbol: &Symbol) -> Arc<Mutex<()>> {
        if let Some(entry) = self.regions.get(symbol) {
            return Arc::clone(entry.value());
        }

        // Racing creators all observe the first inserted region
        let entry = self
            .regions
            .get_or_insert(symbol.clone(), Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Run `f` while holding the region for `symbol`.
    pub fn with_symbol<T>(&self, symbol: &Symbol, f: impl FnOnce() -> T) -> T {
        let region = self.region(symbol);
        let _guard = region.lock();
        f()
    }

    /// Number of symbols seen so far
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
