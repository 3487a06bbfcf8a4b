//! Mood check-ins and the gamification rules around them.
//!
//! A check-in persists the entry, advances the user's streak, raises a
//! crisis alert for very low moods, and unlocks the streak achievement on
//! every seventh consecutive day.

use chrono::{DateTime, Local, NaiveTime, Utc};
use moodhaven_types::achievement::Achievement;
use moodhaven_types::crisis::CrisisAlert;
use moodhaven_types::error::WellnessError;
use moodhaven_types::mood::{MoodEntry, MoodKind, MOOD_LEVEL_MAX, MOOD_LEVEL_MIN};
use tracing::{info, warn};
use uuid::Uuid;

use crate::repository::achievement::AchievementRepository;
use crate::repository::crisis::CrisisRepository;
use crate::repository::mood::MoodRepository;
use crate::repository::user::UserRepository;

/// Mood level at or below which a crisis alert is recorded.
pub const CRISIS_MOOD_THRESHOLD: i32 = 2;

/// Streak length (and every multiple of it) that unlocks the daily-tracker
/// achievement.
const STREAK_ACHIEVEMENT_DAYS: u32 = 7;

/// Default number of entries returned by the history query.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Result of a recorded check-in, including the side effects it triggered.
#[derive(Debug)]
pub struct CheckInOutcome {
    pub entry: MoodEntry,
    pub streak: u32,
    pub crisis_alerted: bool,
    pub unlocked: Option<Achievement>,
}

/// Orchestrates mood check-ins across the mood, user, achievement, and
/// crisis repositories.
pub struct WellnessService<M, U, A, K>
where
    M: MoodRepository,
    U: UserRepository,
    A: AchievementRepository,
    K: CrisisRepository,
{
    moods: M,
    users: U,
    achievements: A,
    crises: K,
}

impl<M, U, A, K> WellnessService<M, U, A, K>
where
    M: MoodRepository,
    U: UserRepository,
    A: AchievementRepository,
    K: CrisisRepository,
{
    pub fn new(moods: M, users: U, achievements: A, crises: K) -> Self {
        Self {
            moods,
            users,
            achievements,
            crises,
        }
    }

    /// Record a mood check-in and run its side effects.
    pub async fn record_check_in(
        &self,
        user_id: Uuid,
        mood_level: i32,
        mood_type: MoodKind,
        notes: Option<String>,
    ) -> Result<CheckInOutcome, WellnessError> {
        if !(MOOD_LEVEL_MIN..=MOOD_LEVEL_MAX).contains(&mood_level) {
            return Err(WellnessError::InvalidMoodLevel(mood_level));
        }

        let user = self
            .users
            .get_user(&user_id)
            .await?
            .ok_or(WellnessError::UserNotFound)?;

        let entry = self
            .moods
            .create_entry(&MoodEntry {
                id: Uuid::now_v7(),
                user_id,
                mood_level,
                mood_type,
                notes: notes.clone(),
                created_at: Utc::now(),
            })
            .await?;

        let streak = user.streak + 1;
        self.users.update_streak(&user_id, streak).await?;

        let crisis_alerted = mood_level <= CRISIS_MOOD_THRESHOLD;
        if crisis_alerted {
            self.crises
                .create_alert(&CrisisAlert {
                    id: Uuid::now_v7(),
                    user_id,
                    mood_level,
                    notes,
                    resolved: false,
                    created_at: Utc::now(),
                })
                .await?;
            warn!(user_id = %user_id, mood_level, "Crisis alert recorded");
        }

        let unlocked = if user.streak > 0 && streak % STREAK_ACHIEVEMENT_DAYS == 0 {
            let achievement = self
                .achievements
                .create_achievement(&Achievement {
                    id: Uuid::now_v7(),
                    user_id,
                    kind: "daily-tracker".to_string(),
                    title: "Daily Tracker".to_string(),
                    description: format!("{streak} days in a row"),
                    icon: "fas fa-calendar-check".to_string(),
                    unlocked_at: Utc::now(),
                })
                .await?;
            info!(user_id = %user_id, streak, "Achievement unlocked");
            Some(achievement)
        } else {
            None
        };

        Ok(CheckInOutcome {
            entry,
            streak,
            crisis_alerted,
            unlocked,
        })
    }

    /// A user's recent mood entries, newest first.
    pub async fn mood_history(
        &self,
        user_id: &Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<MoodEntry>, WellnessError> {
        Ok(self
            .moods
            .entries_for_user(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?)
    }

    /// The user's most recent entry since local midnight, if any.
    pub async fn today_entry(&self, user_id: &Uuid) -> Result<Option<MoodEntry>, WellnessError> {
        let since = local_midnight();
        Ok(self.moods.latest_entry_since(user_id, since).await?)
    }

    /// A user's achievements, newest first.
    pub async fn achievements(&self, user_id: &Uuid) -> Result<Vec<Achievement>, WellnessError> {
        Ok(self.achievements.achievements_for_user(user_id).await?)
    }
}

/// Start of the current day in the server's local timezone, as UTC.
fn local_midnight() -> DateTime<Utc> {
    Local::now()
        .with_time(NaiveTime::MIN)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
