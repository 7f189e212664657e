// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod matching_algorithm;
mod persistence;

pub use event_handler::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
pub use matching_algorithm::{Fills, MatchingAlgorithm};
pub use persistence::{OrderUpdate, PersistenceGateway, RestingQuery, Transaction};

#[cfg(test)]
pub(crate) use event_handler::recording::RecordingEventHandler;
