//! # Presence Registry
//!
//! In-memory map from user id to the single live connection currently attached
//! for that user. The registry is owned by the chat state and starts empty on
//! every process start.
//!
//! A later connection for the same user replaces the earlier one
//! (last-connection-wins). Releasing is compare-and-clear: a connection can only
//! remove the entry that still points at itself.

use lib_core::dto::ServerEvent;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Addressable handle of one live connection.
///
/// Cloning a handle clones the sender side of the connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    /// Enqueue an event for this connection's writer task.
    ///
    /// Never waits on the socket. Returns `false` if the writer is gone.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct PresenceRegistry {
    connections: RwLock<HashMap<i64, ConnectionHandle>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handle` as the user's live connection, returning the displaced one.
    pub async fn register(&self, user_id: i64, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.connections.write().await.insert(user_id, handle)
    }

    /// Remove the user's entry only if it still belongs to `connection_id`.
    pub async fn release(&self, user_id: i64, connection_id: Uuid) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(current) if current.id == connection_id => {
                connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn lookup(&self, user_id: i64) -> Option<ConnectionHandle> {
        self.connections.read().await.get(&user_id).cloned()
    }

    pub async fn is_online(&self, user_id: i64) -> bool {
        self.connections.read().await.contains_key(&user_id)
    }

    /// Best-effort delivery of one event to the user's current connection.
    ///
    /// Returns `true` if the event was enqueued.
    pub async fn emit(&self, user_id: i64, event: ServerEvent) -> bool {
        let Some(handle) = self.lookup(user_id).await else {
            debug!(user_id, event = event.name(), "[CHAT] emit skipped, user offline");
            return false;
        };

        let sent = handle.send(event);
        if !sent {
            debug!(user_id, connection_id = %handle.id, "[CHAT] emit failed, writer closed");
        }
        sent
    }

    pub async fn online_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(tx), rx)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let presence = PresenceRegistry::new();
        let (h1, _rx) = handle();

        assert!(presence.register(1, h1.clone()).await.is_none());

        assert!(presence.is_online(1).await);
        assert!(!presence.is_online(2).await);
        assert_eq!(presence.lookup(1).await.map(|h| h.id), Some(h1.id));
        assert_eq!(presence.online_count().await, 1);
    }

    #[tokio::test]
    async fn test_overwrite_then_stale_release_keeps_newer() {
        let presence = PresenceRegistry::new();
        let (h1, _rx1) = handle();
        let (h2, _rx2) = handle();

        presence.register(7, h1.clone()).await;
        let displaced = presence.register(7, h2.clone()).await;
        assert_eq!(displaced.map(|h| h.id), Some(h1.id));

        // H1 disconnecting late must not remove H2
        assert!(!presence.release(7, h1.id).await);
        assert_eq!(presence.lookup(7).await.map(|h| h.id), Some(h2.id));

        assert!(presence.release(7, h2.id).await);
        assert!(!presence.is_online(7).await);
    }

    #[tokio::test]
    async fn test_emit_reaches_current_connection_only() {
        let presence = PresenceRegistry::new();
        let (h1, mut rx1) = handle();
        let (h2, mut rx2) = handle();
        presence.register(3, h1).await;
        presence.register(3, h2).await;

        assert!(presence.emit(3, ServerEvent::deleted(42)).await);

        assert_eq!(rx2.try_recv().unwrap(), ServerEvent::deleted(42));
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_emit_offline_or_closed() {
        let presence = PresenceRegistry::new();
        assert!(!presence.emit(9, ServerEvent::deleted(1)).await);

        let (h, rx) = handle();
        presence.register(9, h).await;
        drop(rx);
        assert!(!presence.emit(9, ServerEvent::deleted(1)).await);
    }
}
