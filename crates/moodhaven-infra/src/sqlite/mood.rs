//! SQLite mood repository implementation.

use chrono::{DateTime, Utc};
use moodhaven_core::repository::mood::MoodRepository;
use moodhaven_types::error::RepositoryError;
use moodhaven_types::mood::{MoodEntry, MoodKind};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MoodRepository`.
pub struct SqliteMoodRepository {
    pool: DatabasePool,
}

impl SqliteMoodRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain MoodEntry.
struct MoodEntryRow {
    id: String,
    user_id: String,
    mood_level: i64,
    mood_type: String,
    notes: Option<String>,
    created_at: String,
}

impl MoodEntryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            mood_level: row.try_get("mood_level")?,
            mood_type: row.try_get("mood_type")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<MoodEntry, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid entry id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let mood_type: MoodKind = self
            .mood_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(MoodEntry {
            id,
            user_id,
            mood_level: self.mood_level as i32,
            mood_type,
            notes: self.notes,
            created_at,
        })
    }
}

impl MoodRepository for SqliteMoodRepository {
    async fn create_entry(&self, entry: &MoodEntry) -> Result<MoodEntry, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO mood_entries (id, user_id, mood_level, mood_type, notes, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.mood_level as i64)
        .bind(entry.mood_type.to_string())
        .bind(&entry.notes)
        .bind(format_datetime(&entry.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(entry.clone())
    }

    async fn entries_for_user(
        &self,
        user_id: &Uuid,
        limit: i64,
    ) -> Result<Vec<MoodEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM mood_entries WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let entry_row =
                MoodEntryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            entries.push(entry_row.into_entry()?);
        }

        Ok(entries)
    }

    async fn latest_entry_since(
        &self,
        user_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<MoodEntry>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM mood_entries WHERE user_id = ? AND created_at >= ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .bind(format_datetime(&since))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let entry_row = MoodEntryRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(entry_row.into_entry()?))
            }
            None => Ok(None),
        }
    }
}
