//! User account type for Moodhaven.
//!
//! Users own mood entries, chat sessions, achievements, and crisis alerts.
//! The streak and check-in counters drive the gamification layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// `password_hash` is an Argon2id PHC string and is never serialized;
/// JSON field names are camelCase to match the public API wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub display_name: Option<String>,
    /// Consecutive daily check-in streak.
    pub streak: u32,
    pub total_check_ins: u32,
    pub created_at: DateTime<Utc>,
}
