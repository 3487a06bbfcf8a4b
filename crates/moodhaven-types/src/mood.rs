//! Mood check-in types.
//!
//! A mood entry pairs a 1-10 numeric level with a coarse mood kind;
//! the level drives the crisis-alert side effect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Lowest mood level accepted on a check-in.
pub const MOOD_LEVEL_MIN: i32 = 1;
/// Highest mood level accepted on a check-in.
pub const MOOD_LEVEL_MAX: i32 = 10;

/// Coarse mood category chosen by the user.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (mood_type IN ('very-sad', 'sad', 'neutral', 'happy', 'very-happy'))`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoodKind {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl fmt::Display for MoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoodKind::VerySad => write!(f, "very-sad"),
            MoodKind::Sad => write!(f, "sad"),
            MoodKind::Neutral => write!(f, "neutral"),
            MoodKind::Happy => write!(f, "happy"),
            MoodKind::VeryHappy => write!(f, "very-happy"),
        }
    }
}

impl FromStr for MoodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "very-sad" => Ok(MoodKind::VerySad),
            "sad" => Ok(MoodKind::Sad),
            "neutral" => Ok(MoodKind::Neutral),
            "happy" => Ok(MoodKind::Happy),
            "very-happy" => Ok(MoodKind::VeryHappy),
            other => Err(format!("invalid mood type: '{other}'")),
        }
    }
}

/// A single daily mood check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 1-10 scale; values at or below the crisis threshold raise an alert.
    pub mood_level: i32,
    pub mood_type: MoodKind,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
