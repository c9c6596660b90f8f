//! The matchmaker worker: on a fixed tick it sweeps queue entries that timed
//! out, then pairs up what's left by nearest score. Ticks run strictly
//! sequentially (the loop awaits one `run_tick` before scheduling the next),
//! so the worker never needs a lock of its own beyond what the stores use
//! internally.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use conn_hub::ConnectionHub;
use rand::RngCore;
use rand::rngs::OsRng;
use tokio::time::Duration;

use crate::domain::match_record::MatchRecord;
use crate::domain::ports::{MatchesStore, QueueStore};
use crate::domain::queue_entry::{now_millis, QueueEntry};
use crate::interface_adapters::protocol::ServerEvent;

#[derive(Debug, Clone, Copy)]
pub struct MatchmakerConfig {
    pub tick_interval: Duration,
    pub max_score_diff: i64,
    pub queue_timeout: Duration,
}

impl Default for MatchmakerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            max_score_diff: 500,
            queue_timeout: Duration::from_secs(30),
        }
    }
}

pub struct Matchmaker {
    queue_store: Arc<dyn QueueStore>,
    matches_store: Arc<dyn MatchesStore>,
    hub: Arc<ConnectionHub>,
    config: MatchmakerConfig,
    matches_made: AtomicU64,
}

impl Matchmaker {
    pub fn new(
        queue_store: Arc<dyn QueueStore>,
        matches_store: Arc<dyn MatchesStore>,
        hub: Arc<ConnectionHub>,
        config: MatchmakerConfig,
    ) -> Self {
        Self {
            queue_store,
            matches_store,
            hub,
            config,
            matches_made: AtomicU64::new(0),
        }
    }

    pub fn matches_made(&self) -> u64 {
        self.matches_made.load(Ordering::Relaxed)
    }

    /// Discards whatever the queue held over from a prior run, notifying
    /// anyone still connected, then spawns the tick loop. The returned
    /// handle lets the caller abort the ticker on graceful shutdown
    /// (spec §5: SIGINT/SIGTERM stops the matchmaker's ticker).
    pub async fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.clear_queue_and_notify().await;

        let worker = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(worker.config.tick_interval);
            loop {
                interval.tick().await;
                worker.run_tick().await;
            }
        })
    }

    async fn clear_queue_and_notify(&self) {
        match self.queue_store.delete_all().await {
            Ok(removed) => {
                for entry in removed {
                    self.notify_and_close(
                        &entry.username,
                        ServerEvent::QueueCleared {
                            message: "The matchmaking queue was reset, please rejoin".to_string(),
                        },
                    )
                    .await;
                }
            }
            Err(err) => tracing::error!(error = %err, "failed to clear queue at startup"),
        }
    }

    pub async fn run_tick(&self) {
        if let Err(err) = self.queue_store.ping().await {
            tracing::warn!(error = %err, "queue store ping failed, will retry next tick");
            return;
        }

        if let Err(err) = self.sweep_timeouts().await {
            tracing::error!(error = %err, "timeout sweep failed");
            return;
        }

        if let Err(err) = self.pair_waiting_players().await {
            tracing::error!(error = %err, "pairing pass failed");
        }
    }

    async fn sweep_timeouts(&self) -> Result<(), crate::domain::errors::StoreError> {
        let cutoff = now_millis().saturating_sub(self.config.queue_timeout.as_millis() as u64);
        let removed = self.queue_store.delete_where_joined_at_before(cutoff).await?;
        for entry in removed {
            self.notify_and_close(
                &entry.username,
                ServerEvent::QueueTimeout {
                    message: "No opponent was found in time, please requeue".to_string(),
                },
            )
            .await;
        }
        Ok(())
    }

    /// Greedy nearest-score pairing: walk the FIFO-ordered queue, and for
    /// each unpaired entry take the closest-scoring unpaired entry within
    /// `max_score_diff`. Ties go to whichever candidate is earlier in the
    /// scan (i.e. joined first), since the scan already runs oldest-first.
    async fn pair_waiting_players(&self) -> Result<(), crate::domain::errors::StoreError> {
        let entries = self.queue_store.find_all_sorted_by_joined_at_asc().await?;
        if entries.len() < 2 {
            return Ok(());
        }

        let mut paired = HashSet::with_capacity(entries.len());

        for i in 0..entries.len() {
            let a = &entries[i];
            if paired.contains(&a.username) {
                continue;
            }

            let mut best: Option<usize> = None;
            let mut best_diff = i64::MAX;
            for (j, b) in entries.iter().enumerate() {
                if i == j || paired.contains(&b.username) {
                    continue;
                }
                let diff = (a.score - b.score).abs();
                if diff > self.config.max_score_diff {
                    continue;
                }
                if diff < best_diff {
                    best_diff = diff;
                    best = Some(j);
                }
            }

            let Some(j) = best else { continue };
            let b = entries[j].clone();
            self.commit_match(a, &b, &mut paired).await;
        }

        Ok(())
    }

    async fn commit_match(&self, a: &QueueEntry, b: &QueueEntry, paired: &mut HashSet<String>) {
        let room_id = generate_room_id();
        let record = MatchRecord {
            player_a: a.clone(),
            player_b: b.clone(),
            matched_at_millis: now_millis(),
            room_id: room_id.clone(),
        };

        // A match is only committed once the match record is durable; if the
        // store rejects it, leave both players in the queue for the next tick.
        if let Err(err) = self.matches_store.insert(record).await {
            tracing::error!(error = %err, "failed to record match, leaving players queued");
            return;
        }

        if let Err(err) = self
            .queue_store
            .delete_by_usernames(&[a.username.clone(), b.username.clone()])
            .await
        {
            tracing::warn!(error = %err, "match recorded but failed to dequeue players");
        }

        paired.insert(a.username.clone());
        paired.insert(b.username.clone());
        self.matches_made.fetch_add(1, Ordering::Relaxed);

        self.notify_match(a, b, &room_id).await;
        self.notify_match(b, a, &room_id).await;
    }

    async fn notify_match(&self, me: &QueueEntry, opponent: &QueueEntry, room_id: &str) {
        let Some(client_id) = self.hub.client_for_username(&me.username) else {
            return;
        };

        let found = ServerEvent::MatchFound {
            opponent: opponent.username.clone(),
            score: opponent.score,
            room_id: room_id.to_string(),
            timestamp: now_millis(),
            message: "An opponent was found, connect to the game server with this roomId"
                .to_string(),
        };
        if self.hub.send_to(client_id, &found).is_err() {
            return;
        }

        let _ = self.hub.send_to(
            client_id,
            &ServerEvent::ConnectionClosing {
                message: "Closing the matchmaking connection, the match has started".to_string(),
                room_id: room_id.to_string(),
            },
        );
        self.hub
            .close_with_reason(client_id, 1000, "match found")
            .await;
    }

    async fn notify_and_close(&self, username: &str, event: ServerEvent) {
        let Some(client_id) = self.hub.client_for_username(username) else {
            return;
        };
        let _ = self.hub.send_to(client_id, &event);
        self.hub
            .close_with_reason(client_id, 1000, "removed from queue")
            .await;
    }
}

/// 16 hex characters from 8 OS-random bytes; falls back to a timestamp-based
/// id if the platform RNG is unavailable, same as the reference's
/// `generateRoomID`.
fn generate_room_id() -> String {
    let mut bytes = [0u8; 8];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
        Err(_) => format!("{:016x}", now_millis()),
    }
}
