use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use shipyard_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Channels this connection has joined.
    pub channels: HashSet<String>,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    /// Channel name to member connection ids.
    channels: HashMap<String, HashSet<String>>,
}

/// Tracks gateway connections and the channels they have joined.
///
/// Both maps live behind one `RwLock` so membership changes and channel
/// emits never observe a half-updated state. Designed to be wrapped in
/// `Arc` and shared by the gateway handler, the heartbeat and the relay.
#[derive(Default)]
pub struct ChannelRegistry {
    inner: RwLock<Registry>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            channels: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        self.inner.write().await.connections.insert(conn_id, conn);
        rx
    }

    /// Remove a connection and its membership in every channel.
    ///
    /// Returns the removed connection, if it was registered.
    pub async fn remove(&self, conn_id: &str) -> Option<WsConnection> {
        let mut inner = self.inner.write().await;
        let conn = inner.connections.remove(conn_id)?;
        for channel in &conn.channels {
            detach(&mut inner.channels, channel, conn_id);
        }
        Some(conn)
    }

    /// Add a connection to `channel`.
    ///
    /// Returns `false` if the connection is unknown. Joining a channel the
    /// connection is already in is a no-op that still returns `true`.
    pub async fn join(&self, conn_id: &str, channel: &str) -> bool {
        let mut inner = self.inner.write().await;
        let Some(conn) = inner.connections.get_mut(conn_id) else {
            return false;
        };
        conn.channels.insert(channel.to_string());
        inner
            .channels
            .entry(channel.to_string())
            .or_default()
            .insert(conn_id.to_string());
        true
    }

    /// Remove a connection from `channel`. Returns whether it was a member.
    pub async fn leave(&self, conn_id: &str, channel: &str) -> bool {
        let mut inner = self.inner.write().await;
        let was_member = inner
            .connections
            .get_mut(conn_id)
            .is_some_and(|conn| conn.channels.remove(channel));
        if was_member {
            detach(&mut inner.channels, channel, conn_id);
        }
        was_member
    }

    /// Send a message to a single connection. Returns `false` if the
    /// connection is unknown or its sink has gone away.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Send a message to every connection joined to `channel`.
    ///
    /// Never blocks on a client: outbound queues are unbounded and closed
    /// ones are skipped (they are cleaned up by their own receive loop).
    /// Returns the number of connections the message was queued for.
    pub async fn emit_to_channel(&self, channel: &str, message: Message) -> usize {
        let inner = self.inner.read().await;
        let Some(members) = inner.channels.get(channel) else {
            return 0;
        };

        let mut count = 0;
        for conn_id in members {
            if let Some(conn) = inner.connections.get(conn_id) {
                if conn.sender.send(message.clone()).is_ok() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Number of connections joined to `channel`.
    pub async fn channel_size(&self, channel: &str) -> usize {
        self.inner
            .read()
            .await
            .channels
            .get(channel)
            .map_or(0, HashSet::len)
    }

    /// Channels a connection has joined, sorted.
    pub async fn channels_of(&self, conn_id: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut channels: Vec<String> = inner
            .connections
            .get(conn_id)
            .map(|conn| conn.channels.iter().cloned().collect())
            .unwrap_or_default();
        channels.sort();
        channels
    }

    /// Send a Close frame to every connection, then clear the registry.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.connections.len();
        for conn in inner.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        inner.connections.clear();
        inner.channels.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let inner = self.inner.read().await;
        for conn in inner.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

/// Drop `conn_id` from `channel`, removing the channel once empty.
fn detach(channels: &mut HashMap<String, HashSet<String>>, channel: &str, conn_id: &str) {
    if let Some(members) = channels.get_mut(channel) {
        members.remove(conn_id);
        if members.is_empty() {
            channels.remove(channel);
        }
    }
}
