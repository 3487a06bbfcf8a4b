//! Wire frames for the realtime channel.
//!
//! Inbound frames are JSON text with a `type` tag; field names are
//! camelCase on the wire. Frame types other than `chat_message` parse into
//! `Unknown` and are ignored by the relay (reserved for future extension),
//! which is distinct from a malformed frame.

use moodhaven_types::chat::ChatMessage;
use serde::{Deserialize, Serialize};

/// A frame received from a client over the realtime channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// A chat payload to persist and fan out.
    ///
    /// `sender_id` is accepted for wire compatibility but the relay
    /// attributes the message to the connection's authenticated identity.
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        session_id: String,
        #[serde(default)]
        sender_id: Option<String>,
        sender_type: String,
        message: String,
    },
    /// Any other frame type; silently ignored.
    #[serde(other)]
    Unknown,
}

/// A frame sent to clients over the realtime channel.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Connectivity-established signal, sent once after the handshake.
    Connected,
    /// A persisted chat message, fanned out by the relay.
    ChatMessage { message: ChatMessage },
    /// A per-frame failure, reported only to the originating connection.
    Error { message: String },
}
