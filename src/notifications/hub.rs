use axum::response::sse::Event;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One live push channel to a single browser session
struct LiveConnection {
    id: u64,
    tx: mpsc::UnboundedSender<Event>,
}

/// Registry of live SSE connections, keyed by user id
///
/// A user may hold any number of simultaneous connections (multiple open
/// dashboards). The registry owns all fan-out and pruning logic; callers
/// only ever add, remove, or emit - raw iteration is not exposed.
pub struct SseHub {
    connections: DashMap<Uuid, Vec<LiveConnection>>,
    next_id: AtomicU64,
}

impl SseHub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add a live connection for a user; returns its id and event receiver
    pub fn register(&self, user_id: Uuid) -> (u64, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.connections
            .entry(user_id)
            .or_default()
            .push(LiveConnection { id, tx });

        tracing::debug!("SSE connection {} registered for user {}", id, user_id);
        (id, rx)
    }

    /// Register and receive a guard that unregisters when dropped
    pub fn register_guarded(
        self: Arc<Self>,
        user_id: Uuid,
    ) -> (ConnectionGuard, mpsc::UnboundedReceiver<Event>) {
        let (id, rx) = self.register(user_id);
        (
            ConnectionGuard {
                hub: self,
                user_id,
                connection_id: id,
            },
            rx,
        )
    }

    /// Remove a connection; drops the user's entry once it holds nothing
    pub fn unregister(&self, user_id: Uuid, connection_id: u64) {
        if let Some(mut entry) = self.connections.get_mut(&user_id) {
            entry.retain(|conn| conn.id != connection_id);
        }
        self.connections.remove_if(&user_id, |_, conns| conns.is_empty());
        tracing::debug!("SSE connection {} unregistered for user {}", connection_id, user_id);
    }

    /// Fan a named event out to every live connection of a user
    ///
    /// Never fails and never blocks: each write is a buffered channel send.
    /// A connection whose receiver has gone away is pruned on the spot and
    /// the fan-out continues with the rest.
    pub fn emit(&self, user_id: Uuid, event_name: &str, payload: &serde_json::Value) {
        if let Some(mut entry) = self.connections.get_mut(&user_id) {
            entry.retain(|conn| {
                let event = match Event::default().event(event_name).json_data(payload) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!("Failed to serialize SSE event {}: {}", event_name, e);
                        return true;
                    }
                };

                match conn.tx.send(event) {
                    Ok(()) => true,
                    Err(_) => {
                        tracing::warn!(
                            "Pruning dead SSE connection {} for user {}",
                            conn.id,
                            user_id
                        );
                        false
                    }
                }
            });
        }
        self.connections.remove_if(&user_id, |_, conns| conns.is_empty());
    }

    /// Number of live connections for one user
    pub fn user_connection_count(&self, user_id: Uuid) -> usize {
        self.connections.get(&user_id).map(|c| c.len()).unwrap_or(0)
    }

    /// Total number of live connections across all users
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for SseHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Unregisters its connection when dropped, covering client disconnects
/// and failed transport writes alike (axum drops the stream either way).
pub struct ConnectionGuard {
    hub: Arc<SseHub>,
    user_id: Uuid,
    connection_id: u64,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.hub.unregister(self.user_id, self.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_unregister() {
        let hub = SseHub::new();
        let user = Uuid::new_v4();

        let (id1, _rx1) = hub.register(user);
        let (id2, _rx2) = hub.register(user);
        assert_eq!(hub.user_connection_count(user), 2);

        hub.unregister(user, id1);
        assert_eq!(hub.user_connection_count(user), 1);

        // Removing the last connection drops the user's entry entirely
        hub.unregister(user, id2);
        assert_eq!(hub.user_connection_count(user), 0);
        assert_eq!(hub.connection_count(), 0);
    }

    #[test]
    fn test_emit_reaches_all_connections() {
        let hub = SseHub::new();
        let user = Uuid::new_v4();

        let (_id1, mut rx1) = hub.register(user);
        let (_id2, mut rx2) = hub.register(user);

        hub.emit(user, "task_triggered", &json!({"label": "swap"}));

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_emit_to_other_user_is_isolated() {
        let hub = SseHub::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let (_id, mut alice_rx) = hub.register(alice);
        hub.emit(bob, "task_triggered", &json!({}));

        assert!(alice_rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_write_prunes_only_the_dead_connection() {
        let hub = SseHub::new();
        let user = Uuid::new_v4();

        let (_id1, mut rx1) = hub.register(user);
        let (_id2, rx2) = hub.register(user);
        let (_id3, mut rx3) = hub.register(user);

        // Simulate a dead client: its receiver is gone
        drop(rx2);

        hub.emit(user, "task_triggered", &json!({"label": "swap"}));

        // The two healthy connections still got the event
        assert!(rx1.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());
        // The dead one was pruned during the fan-out
        assert_eq!(hub.user_connection_count(user), 2);
    }

    #[test]
    fn test_emit_with_no_connections_is_a_noop() {
        let hub = SseHub::new();
        hub.emit(Uuid::new_v4(), "task_triggered", &json!({}));
        assert_eq!(hub.connection_count(), 0);
    }

    #[test]
    fn test_guard_unregisters_on_drop() {
        let hub = Arc::new(SseHub::new());
        let user = Uuid::new_v4();

        let (guard, _rx) = Arc::clone(&hub).register_guarded(user);
        assert_eq!(hub.user_connection_count(user), 1);

        drop(guard);
        assert_eq!(hub.user_connection_count(user), 0);
    }
}
