//! The record of a single waiting player. Uniqueness key is `username`; a
//! later `queue` frame for the same username overwrites the token, score and
//! `joined_at`, not appends a second entry.

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub username: String,
    pub token: String,
    pub score: i64,
    pub cluster: String,
    /// Milliseconds since the epoch; used for both FIFO scan order and the
    /// timeout sweep.
    pub joined_at_millis: u64,
}

impl QueueEntry {
    pub fn new(username: String, token: String, score: i64, cluster: String) -> Self {
        Self {
            username,
            token,
            score,
            cluster,
            joined_at_millis: now_millis(),
        }
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
