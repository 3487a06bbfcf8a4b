//! SQLite crisis alert repository implementation.

use moodhaven_core::repository::crisis::CrisisRepository;
use moodhaven_types::crisis::CrisisAlert;
use moodhaven_types::error::RepositoryError;

use super::format_datetime;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `CrisisRepository`.
pub struct SqliteCrisisRepository {
    pool: DatabasePool,
}

impl SqliteCrisisRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl CrisisRepository for SqliteCrisisRepository {
    async fn create_alert(&self, alert: &CrisisAlert) -> Result<CrisisAlert, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO crisis_alerts (id, user_id, mood_level, notes, resolved, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(alert.id.to_string())
        .bind(alert.user_id.to_string())
        .bind(alert.mood_level as i64)
        .bind(&alert.notes)
        .bind(alert.resolved as i64)
        .bind(format_datetime(&alert.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(alert.clone())
    }
}
