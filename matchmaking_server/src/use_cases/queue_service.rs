//! Handles the `queue`/`cancel` frames a connected client sends directly
//! (as opposed to the periodic work the `Matchmaker` worker does on its own
//! tick). Lives next to `matchmaker` because both operate on the same Queue
//! Store port.

use std::sync::Arc;

use conn_hub::{ClientId, ConnectionHub};

use crate::domain::ports::QueueStore;
use crate::domain::queue_entry::QueueEntry;
use crate::interface_adapters::protocol::{CancelRequest, QueueRequest, ServerEvent};

pub struct QueueService {
    queue_store: Arc<dyn QueueStore>,
    hub: Arc<ConnectionHub>,
    cluster: String,
}

impl QueueService {
    pub fn new(queue_store: Arc<dyn QueueStore>, hub: Arc<ConnectionHub>, cluster: String) -> Self {
        Self {
            queue_store,
            hub,
            cluster,
        }
    }

    /// Upserts the player into the queue and binds their username to this
    /// connection so the matchmaker worker can address them later.
    pub async fn handle_queue(&self, client_id: ClientId, request: QueueRequest) -> ServerEvent {
        self.hub.bind_username(&request.username, client_id);

        let entry = QueueEntry::new(
            request.username,
            request.token,
            request.score,
            self.cluster.clone(),
        );

        match self.queue_store.upsert(entry).await {
            Ok(()) => ServerEvent::QueueSuccess {
                message: "You have been added to the matchmaking queue".to_string(),
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to add player to queue");
                ServerEvent::Error {
                    message: "Failed to add player to queue".to_string(),
                }
            }
        }
    }

    pub async fn handle_cancel(&self, request: CancelRequest) -> ServerEvent {
        match self
            .queue_store
            .delete_by_username_and_token(&request.username, &request.token)
            .await
        {
            Ok(true) => ServerEvent::CancelSuccess {
                message: "You have been removed from the matchmaking queue".to_string(),
            },
            Ok(false) => ServerEvent::Error {
                message: "Failed to remove player from queue: player not found in queue"
                    .to_string(),
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to remove player from queue");
                ServerEvent::Error {
                    message: "Failed to remove player from queue".to_string(),
                }
            }
        }
    }
}
