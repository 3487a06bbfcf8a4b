//! Chat session and message types for the counselor chat subsystem.
//!
//! Sessions bound a period of chat activity between a user and an
//! (optionally anonymous) counselor. Messages are ordered solely by their
//! server-assigned creation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who authored a chat message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sender_type IN ('user', 'counselor', 'system'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    User,
    Counselor,
    System,
}

impl fmt::Display for SenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderKind::User => write!(f, "user"),
            SenderKind::Counselor => write!(f, "counselor"),
            SenderKind::System => write!(f, "system"),
        }
    }
}

impl FromStr for SenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(SenderKind::User),
            "counselor" => Ok(SenderKind::Counselor),
            "system" => Ok(SenderKind::System),
            other => Err(format!("invalid sender type: '{other}'")),
        }
    }
}

/// A bounded period of chat activity owned by a single user.
///
/// At most one session per user may have `is_active == true` at any time;
/// the store enforces this with a partial unique index. `ended_at` is set
/// exactly once, when the session closes. Sessions are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Absent while the counselor stays anonymous.
    pub counselor_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// A single message within a chat session.
///
/// `sender_id` is absent only for system-generated messages. `created_at`
/// is assigned at persistence time and is the sole ordering key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub sender_type: SenderKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
