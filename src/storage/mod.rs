// ============================================================================
// Storage Module
// Persistence gateway implementations
// ============================================================================

mod memory;

pub use memory::{InMemoryStore, MemoryTransaction};
