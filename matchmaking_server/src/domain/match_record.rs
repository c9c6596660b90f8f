//! An immutable record of a produced match, appended to the Matches Store.

use crate::domain::queue_entry::QueueEntry;

#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub player_a: QueueEntry,
    pub player_b: QueueEntry,
    pub matched_at_millis: u64,
    pub room_id: String,
}
