//! Achievement records unlocked by the gamification rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An achievement unlocked by a user.
///
/// `kind` is a machine-readable slug (e.g. "daily-tracker"); title,
/// description, and icon are presentation strings stored alongside it so
/// history survives rule changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_type() {
        let achievement = Achievement {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            kind: "daily-tracker".to_string(),
            title: "Daily Tracker".to_string(),
            description: "7 days in a row".to_string(),
            icon: "fas fa-calendar-check".to_string(),
            unlocked_at: Utc::now(),
        };
        let json = serde_json::to_string(&achievement).unwrap();
        assert!(json.contains("\"type\":\"daily-tracker\""));
        assert!(!json.contains("\"kind\""));

        let parsed: Achievement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, "daily-tracker");
    }
}
