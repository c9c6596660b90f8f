//! Shared connection manager used by both the matchmaking and game
//! websocket services. Upgrades are performed by the caller; this hub only
//! tracks `clientId -> outbound channel` and `username -> clientId` and
//! gives callers a thread-safe way to address a client without holding a
//! reference to its socket.
//!
//! Per the design note in the reference material: the two registries are
//! each wrapped in their own lock-owning type so no task ever needs to hold
//! more than one of these locks at a time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

/// The pause between the last application frame and the close frame, so the
/// client has time to process whatever was just sent to it.
pub const CLOSE_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// A frame queued for delivery to one client's socket.
#[derive(Debug)]
pub enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Debug)]
pub enum HubError {
    /// The client has already disconnected or was never registered.
    Gone,
    Serialization(serde_json::Error),
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::Gone => write!(f, "client is gone"),
            HubError::Serialization(e) => write!(f, "failed to serialize event: {e}"),
        }
    }
}

impl std::error::Error for HubError {}

struct ClientRegistry {
    next_id: AtomicU64,
    senders: Mutex<HashMap<ClientId, mpsc::UnboundedSender<Outbound>>>,
}

impl ClientRegistry {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            senders: Mutex::new(HashMap::new()),
        }
    }

    fn register(&self, sender: mpsc::UnboundedSender<Outbound>) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.senders.lock().unwrap().insert(id, sender);
        id
    }

    fn get(&self, id: ClientId) -> Option<mpsc::UnboundedSender<Outbound>> {
        self.senders.lock().unwrap().get(&id).cloned()
    }

    fn remove(&self, id: ClientId) {
        self.senders.lock().unwrap().remove(&id);
    }
}

struct UsernameRegistry {
    by_name: Mutex<HashMap<String, ClientId>>,
}

impl UsernameRegistry {
    fn new() -> Self {
        Self {
            by_name: Mutex::new(HashMap::new()),
        }
    }

    fn bind(&self, username: &str, id: ClientId) {
        // Latest binding wins, per the hub contract.
        self.by_name.lock().unwrap().insert(username.to_string(), id);
    }

    fn get(&self, username: &str) -> Option<ClientId> {
        self.by_name.lock().unwrap().get(username).copied()
    }

    /// Removes every username entry pointing at `id`. A client normally owns
    /// at most one username, but cleanup is defensive against races during
    /// reconnects.
    fn unbind_client(&self, id: ClientId) {
        self.by_name.lock().unwrap().retain(|_, v| *v != id);
    }
}

/// Process-wide connection manager. Cheap to clone (wrap in an `Arc`).
pub struct ConnectionHub {
    clients: ClientRegistry,
    usernames: UsernameRegistry,
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            clients: ClientRegistry::new(),
            usernames: UsernameRegistry::new(),
        }
    }

    /// Assigns a monotonically increasing client id and records its
    /// outbound channel. The caller owns forwarding `Outbound` values from
    /// the returned channel's receiver onto the real socket.
    pub fn register(&self, sender: mpsc::UnboundedSender<Outbound>) -> ClientId {
        self.clients.register(sender)
    }

    /// Latest binding wins.
    pub fn bind_username(&self, username: &str, client_id: ClientId) {
        self.usernames.bind(username, client_id);
    }

    pub fn client_for_username(&self, username: &str) -> Option<ClientId> {
        self.usernames.get(username)
    }

    /// Serializes `value` and enqueues it for the target client. Returns an
    /// error if the peer is gone; does not retry.
    pub fn send_to(&self, client_id: ClientId, value: &impl Serialize) -> Result<(), HubError> {
        let text = serde_json::to_string(value).map_err(HubError::Serialization)?;
        let sender = self.clients.get(client_id).ok_or(HubError::Gone)?;
        sender.send(Outbound::Text(text)).map_err(|_| HubError::Gone)
    }

    pub fn send_to_username(&self, username: &str, value: &impl Serialize) -> Result<(), HubError> {
        let client_id = self.client_for_username(username).ok_or(HubError::Gone)?;
        self.send_to(client_id, value)
    }

    /// Sends a graceful close frame, then drops the client's outbound
    /// channel, then unbinds any username pointing at it. Inserts the
    /// standard pause before the close frame so a just-sent application
    /// frame has time to reach the client.
    pub async fn close_with_reason(&self, client_id: ClientId, code: u16, reason: &str) {
        tokio::time::sleep(CLOSE_GRACE).await;
        if let Some(sender) = self.clients.get(client_id) {
            let _ = sender.send(Outbound::Close {
                code,
                reason: reason.to_string(),
            });
        }
        self.clients.remove(client_id);
        self.usernames.unbind_client(client_id);
    }

    /// Drops a client's registration without sending anything, for the case
    /// where the socket already closed locally (reader hit EOF/error).
    pub fn unregister(&self, client_id: ClientId) {
        self.clients.remove(client_id);
        self.usernames.unbind_client(client_id);
    }
}
