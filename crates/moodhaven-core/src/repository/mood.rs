//! MoodRepository trait definition.

use chrono::{DateTime, Utc};
use moodhaven_types::error::RepositoryError;
use moodhaven_types::mood::MoodEntry;
use uuid::Uuid;

/// Repository trait for mood check-in persistence.
pub trait MoodRepository: Send + Sync {
    /// Persist a new mood entry.
    fn create_entry(
        &self,
        entry: &MoodEntry,
    ) -> impl std::future::Future<Output = Result<MoodEntry, RepositoryError>> + Send;

    /// A user's entries, newest first.
    fn entries_for_user(
        &self,
        user_id: &Uuid,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<MoodEntry>, RepositoryError>> + Send;

    /// The user's most recent entry created at or after `since`, if any.
    fn latest_entry_since(
        &self,
        user_id: &Uuid,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<MoodEntry>, RepositoryError>> + Send;
}
