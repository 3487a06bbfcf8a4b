//! Live connection registry for the realtime channel.
//!
//! Tracks every open WebSocket connection together with its authenticated
//! user and (once the first accepted message names one) its chat session.
//! Deliveries go through per-connection unbounded channels; the owning
//! socket task pumps its receiver into the socket sink.
//!
//! The registry is an owned instance on the application state -- there is
//! no ambient global connection set.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque identifier for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

struct Connection {
    user_id: Uuid,
    /// Set when the connection's first accepted message names a session.
    session_id: Option<Uuid>,
    sender: mpsc::UnboundedSender<String>,
}

/// Registry of live realtime connections.
///
/// register/unregister are called from connection lifecycle events;
/// broadcast is called from the relay. All three are safe to interleave.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<Uuid, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live connection tied to a user.
    ///
    /// Returns the connection's id and the receiving half of its delivery
    /// channel. No session binding occurs at registration.
    pub fn register(&self, user_id: Uuid) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::now_v7();
        let (sender, receiver) = mpsc::unbounded_channel();
        self.connections.insert(
            id,
            Connection {
                user_id,
                session_id: None,
                sender,
            },
        );
        tracing::debug!(connection_id = %id, user_id = %user_id, "Connection registered");
        (ConnectionId(id), receiver)
    }

    /// Remove a connection. Idempotent: unknown ids are ignored.
    pub fn unregister(&self, id: ConnectionId) {
        if self.connections.remove(&id.0).is_some() {
            tracing::debug!(connection_id = %id, "Connection unregistered");
        }
    }

    /// Bind a connection to a chat session if it has no binding yet.
    pub fn bind_session(&self, id: ConnectionId, session_id: Uuid) {
        if let Some(mut conn) = self.connections.get_mut(&id.0) {
            if conn.session_id.is_none() {
                conn.session_id = Some(session_id);
            }
        }
    }

    /// The session a connection is bound to, if any.
    pub fn session_binding(&self, id: ConnectionId) -> Option<Uuid> {
        self.connections.get(&id.0).and_then(|c| c.session_id)
    }

    /// The authenticated user behind a connection.
    pub fn user_of(&self, id: ConnectionId) -> Option<Uuid> {
        self.connections.get(&id.0).map(|c| c.user_id)
    }

    /// Send the serialized payload to every currently-registered open
    /// connection. Connections whose receiving task has gone away are
    /// silently skipped; they are removed on their close event.
    ///
    /// Returns the number of connections the payload was handed to.
    pub fn broadcast_all(&self, payload: &str) -> usize {
        let mut delivered = 0;
        for conn in self.connections.iter() {
            if conn.sender.send(payload.to_string()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Send the serialized payload to connections bound to the given session.
    pub fn broadcast_session(&self, session_id: Uuid, payload: &str) -> usize {
        let mut delivered = 0;
        for conn in self.connections.iter() {
            if conn.session_id == Some(session_id) && conn.sender.send(payload.to_string()).is_ok()
            {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of currently-registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_broadcast_reaches_everyone() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = registry.register(Uuid::now_v7());
        let (_b, mut rx_b) = registry.register(Uuid::now_v7());

        let delivered = registry.broadcast_all("payload");
        assert_eq!(delivered, 2);
        assert_eq!(rx_a.try_recv().unwrap(), "payload");
        assert_eq!(rx_b.try_recv().unwrap(), "payload");
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = registry.register(Uuid::now_v7());

        registry.unregister(id);
        assert!(registry.is_empty());
        // A second removal of the same connection must not fail.
        registry.unregister(id);
    }

    #[test]
    fn dropped_receiver_is_silently_skipped() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = registry.register(Uuid::now_v7());
        let (_b, rx_b) = registry.register(Uuid::now_v7());
        drop(rx_b);

        let delivered = registry.broadcast_all("payload");
        assert_eq!(delivered, 1);
        assert_eq!(rx_a.try_recv().unwrap(), "payload");
    }

    #[test]
    fn session_binding_set_once() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = registry.register(Uuid::now_v7());
        assert_eq!(registry.session_binding(id), None);

        let first = Uuid::now_v7();
        registry.bind_session(id, first);
        assert_eq!(registry.session_binding(id), Some(first));

        // Later bindings do not overwrite the first.
        registry.bind_session(id, Uuid::now_v7());
        assert_eq!(registry.session_binding(id), Some(first));
    }

    #[test]
    fn broadcast_session_scopes_delivery() {
        let registry = ConnectionRegistry::new();
        let session = Uuid::now_v7();

        let (a, mut rx_a) = registry.register(Uuid::now_v7());
        let (b, mut rx_b) = registry.register(Uuid::now_v7());
        let (_c, mut rx_c) = registry.register(Uuid::now_v7());

        registry.bind_session(a, session);
        registry.bind_session(b, session);

        let delivered = registry.broadcast_session(session, "scoped");
        assert_eq!(delivered, 2);
        assert_eq!(rx_a.try_recv().unwrap(), "scoped");
        assert_eq!(rx_b.try_recv().unwrap(), "scoped");
        assert!(rx_c.try_recv().is_err());
    }

    #[test]
    fn user_of_returns_registered_identity() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();
        let (id, _rx) = registry.register(user);
        assert_eq!(registry.user_of(id), Some(user));
    }
}
