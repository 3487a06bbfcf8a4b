//! Persist-and-broadcast relay.
//!
//! One `MessageRelay` instance serves all connections. For each inbound
//! text frame: parse, validate, persist through the session manager, then
//! fan the stored record out through the connection registry. Every failure
//! is terminal only for that one frame -- the offending connection gets an
//! error frame and stays open, and no other connection is affected.

use std::sync::Arc;

use moodhaven_types::chat::SenderKind;
use moodhaven_types::error::{ChatError, RelayError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::chat::service::ChatService;
use crate::relay::frame::{InboundFrame, OutboundFrame};
use crate::relay::registry::{ConnectionId, ConnectionRegistry};
use crate::relay::BroadcastScope;

/// Translates inbound realtime frames into persisted messages and
/// outbound broadcasts.
pub struct MessageRelay<C: ChatRepository> {
    chat: Arc<ChatService<C>>,
    registry: Arc<ConnectionRegistry>,
    scope: BroadcastScope,
}

impl<C: ChatRepository> MessageRelay<C> {
    pub fn new(
        chat: Arc<ChatService<C>>,
        registry: Arc<ConnectionRegistry>,
        scope: BroadcastScope,
    ) -> Self {
        Self {
            chat,
            registry,
            scope,
        }
    }

    /// The registry this relay broadcasts through.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The configured fan-out scope.
    pub fn scope(&self) -> BroadcastScope {
        self.scope
    }

    /// Handle one inbound text frame from a connection.
    ///
    /// Returns an error frame to deliver to the originating connection
    /// only, or `None` when the frame was either broadcast successfully or
    /// silently ignored (unknown frame type).
    ///
    /// `user_id` is the identity authenticated at handshake time; it
    /// overrides any client-supplied sender id for non-system messages.
    pub async fn handle_frame(
        &self,
        connection: ConnectionId,
        user_id: Uuid,
        raw: &str,
    ) -> Option<OutboundFrame> {
        let frame: InboundFrame = match serde_json::from_str(raw) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(connection_id = %connection, error = %err, "Malformed realtime frame");
                return Some(error_frame(RelayError::MalformedPayload));
            }
        };

        let (session_id, sender_type, message) = match frame {
            InboundFrame::ChatMessage {
                session_id,
                sender_id: _,
                sender_type,
                message,
            } => (session_id, sender_type, message),
            InboundFrame::Unknown => {
                debug!(connection_id = %connection, "Ignoring unknown frame type");
                return None;
            }
        };

        let sender_type: SenderKind = match sender_type.parse() {
            Ok(kind) => kind,
            Err(err) => {
                return Some(error_frame(RelayError::Validation(err)));
            }
        };
        if message.trim().is_empty() {
            return Some(error_frame(RelayError::Validation(
                "message must not be empty".to_string(),
            )));
        }
        let session_id: Uuid = match session_id.parse() {
            Ok(id) => id,
            Err(_) => {
                return Some(error_frame(RelayError::Validation(
                    "invalid session id".to_string(),
                )));
            }
        };

        // Attribute the message to the connection's authenticated identity;
        // the client-supplied sender id is not trusted.
        let sender_id = match sender_type {
            SenderKind::System => None,
            _ => Some(user_id),
        };

        let stored = match self
            .chat
            .record_message(session_id, sender_id, sender_type, message)
            .await
        {
            Ok(stored) => stored,
            Err(ChatError::SessionNotFound) => {
                return Some(error_frame(RelayError::Validation(
                    "unknown session".to_string(),
                )));
            }
            Err(ChatError::SessionClosed) => {
                return Some(error_frame(RelayError::Validation(
                    "session has ended".to_string(),
                )));
            }
            Err(err) => {
                warn!(connection_id = %connection, error = %err, "Failed to persist chat message");
                return Some(error_frame(RelayError::Persistence(err.to_string())));
            }
        };

        self.registry.bind_session(connection, session_id);

        let envelope = OutboundFrame::ChatMessage { message: stored };
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "Failed to serialize outbound envelope");
                return Some(error_frame(RelayError::Persistence(err.to_string())));
            }
        };

        let delivered = match self.scope {
            BroadcastScope::Global => self.registry.broadcast_all(&payload),
            BroadcastScope::Session => self.registry.broadcast_session(session_id, &payload),
        };
        debug!(
            connection_id = %connection,
            session_id = %session_id,
            delivered,
            "Chat message relayed"
        );
        None
    }
}

fn error_frame(err: RelayError) -> OutboundFrame {
    OutboundFrame::Error {
        message: err.to_string(),
    }
}
