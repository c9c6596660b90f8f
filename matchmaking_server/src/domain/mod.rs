// Domain layer: queue/match entities and the store ports the worker depends on.

pub mod errors;
pub mod match_record;
pub mod ports;
pub mod queue_entry;

pub use errors::StoreError;
pub use match_record::MatchRecord;
pub use ports::{MatchesStore, QueueStore};
pub use queue_entry::QueueEntry;
