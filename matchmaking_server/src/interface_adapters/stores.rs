//! In-memory adapters for the `QueueStore`/`MatchesStore` ports. The real
//! document-database-backed adapter is an external collaborator out of
//! scope for this crate; these stand in for it so the worker and handlers
//! have something concrete to run against, and so a Mongo-backed adapter
//! can be dropped in later behind the same trait.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::match_record::MatchRecord;
use crate::domain::ports::{MatchesStore, QueueStore};
use crate::domain::queue_entry::QueueEntry;

#[derive(Default)]
pub struct InMemoryQueueStore {
    entries: Mutex<HashMap<String, QueueEntry>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn upsert(&self, entry: QueueEntry) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.username.clone(), entry);
        Ok(())
    }

    async fn find_all_sorted_by_joined_at_asc(&self) -> Result<Vec<QueueEntry>, StoreError> {
        let mut entries: Vec<QueueEntry> = self.entries.lock().unwrap().values().cloned().collect();
        entries.sort_by_key(|e| e.joined_at_millis);
        Ok(entries)
    }

    async fn delete_by_usernames(&self, usernames: &[String]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        for username in usernames {
            entries.remove(username);
        }
        Ok(())
    }

    async fn delete_where_joined_at_before(
        &self,
        cutoff_millis: u64,
    ) -> Result<Vec<QueueEntry>, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let stale: Vec<String> = entries
            .values()
            .filter(|e| e.joined_at_millis < cutoff_millis)
            .map(|e| e.username.clone())
            .collect();
        let mut removed = Vec::with_capacity(stale.len());
        for username in stale {
            if let Some(entry) = entries.remove(&username) {
                removed.push(entry);
            }
        }
        Ok(removed)
    }

    async fn delete_by_username_and_token(
        &self,
        username: &str,
        token: &str,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.get(username).map(|e| e.token == token) == Some(true) {
            entries.remove(username);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_all(&self) -> Result<Vec<QueueEntry>, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let removed: Vec<QueueEntry> = entries.values().cloned().collect();
        entries.clear();
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMatchesStore {
    records: Mutex<Vec<MatchRecord>>,
}

impl InMemoryMatchesStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl MatchesStore for InMemoryMatchesStore {
    async fn insert(&self, record: MatchRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(username: &str, score: i64, joined_at_millis: u64) -> QueueEntry {
        QueueEntry {
            username: username.to_string(),
            token: "tok".to_string(),
            score,
            cluster: "default".to_string(),
            joined_at_millis,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_username() {
        let store = InMemoryQueueStore::new();
        store.upsert(entry("alice", 100, 1)).await.unwrap();
        store.upsert(entry("alice", 200, 2)).await.unwrap();

        let all = store.find_all_sorted_by_joined_at_asc().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 200);
        assert_eq!(all[0].joined_at_millis, 2);
    }

    #[tokio::test]
    async fn find_all_sorted_is_fifo() {
        let store = InMemoryQueueStore::new();
        store.upsert(entry("b", 0, 20)).await.unwrap();
        store.upsert(entry("a", 0, 10)).await.unwrap();

        let all = store.find_all_sorted_by_joined_at_asc().await.unwrap();
        assert_eq!(all[0].username, "a");
        assert_eq!(all[1].username, "b");
    }

    #[tokio::test]
    async fn delete_where_joined_before_returns_removed_rows() {
        let store = InMemoryQueueStore::new();
        store.upsert(entry("old", 0, 5)).await.unwrap();
        store.upsert(entry("new", 0, 50)).await.unwrap();

        let removed = store.delete_where_joined_at_before(10).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].username, "old");

        let remaining = store.find_all_sorted_by_joined_at_asc().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username, "new");
    }

    #[tokio::test]
    async fn cancel_requires_matching_token() {
        let store = InMemoryQueueStore::new();
        store.upsert(entry("alice", 0, 1)).await.unwrap();

        assert!(!store
            .delete_by_username_and_token("alice", "wrong")
            .await
            .unwrap());
        assert!(store
            .delete_by_username_and_token("alice", "tok")
            .await
            .unwrap());
        assert!(store
            .find_all_sorted_by_joined_at_asc()
            .await
            .unwrap()
            .is_empty());
    }
}
