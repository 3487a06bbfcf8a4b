//! Crisis alert records raised by very low mood check-ins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An alert recorded when a check-in reports a very low mood.
///
/// Alerts are created unresolved; support staff flip `resolved`
/// out-of-band. This subsystem only ever creates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_level: i32,
    pub notes: Option<String>,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_alert_serialize() {
        let alert = CrisisAlert {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            mood_level: 2,
            notes: None,
            resolved: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"moodLevel\":2"));
        assert!(json.contains("\"resolved\":false"));
    }
}
