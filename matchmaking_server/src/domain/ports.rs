//! Outbound ports the matchmaker depends on. A real deployment backs these
//! with the `matchmaking`/`matches` collections of a document database; the
//! bundled adapter in `interface_adapters::stores` is in-memory, since the
//! store itself is an external collaborator out of scope for this crate.

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::match_record::MatchRecord;
use crate::domain::queue_entry::QueueEntry;

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Idempotent on `username`: inserts a new entry, or overwrites
    /// token/score/cluster/joined_at if one already exists.
    async fn upsert(&self, entry: QueueEntry) -> Result<(), StoreError>;

    /// Stable FIFO scan, oldest `joined_at` first.
    async fn find_all_sorted_by_joined_at_asc(&self) -> Result<Vec<QueueEntry>, StoreError>;

    /// Atomically removes every entry whose username is in `usernames`.
    async fn delete_by_usernames(&self, usernames: &[String]) -> Result<(), StoreError>;

    /// Removes and returns every entry with `joined_at < cutoff_millis`.
    async fn delete_where_joined_at_before(
        &self,
        cutoff_millis: u64,
    ) -> Result<Vec<QueueEntry>, StoreError>;

    /// Removes a single entry by `(username, token)`. Returns whether a row
    /// was actually deleted.
    async fn delete_by_username_and_token(
        &self,
        username: &str,
        token: &str,
    ) -> Result<bool, StoreError>;

    /// Clears the whole collection; run once at worker startup to discard
    /// state left behind by a prior crash. Returns the removed rows so
    /// their owners can be notified.
    async fn delete_all(&self) -> Result<Vec<QueueEntry>, StoreError>;

    /// Liveness check performed at the top of every tick; a failure
    /// triggers a reconnect attempt before the tick continues.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MatchesStore: Send + Sync {
    async fn insert(&self, record: MatchRecord) -> Result<(), StoreError>;
}
