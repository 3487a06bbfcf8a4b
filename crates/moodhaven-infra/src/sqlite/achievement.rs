//! SQLite achievement repository implementation.

use moodhaven_core::repository::achievement::AchievementRepository;
use moodhaven_types::achievement::Achievement;
use moodhaven_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `AchievementRepository`.
pub struct SqliteAchievementRepository {
    pool: DatabasePool,
}

impl SqliteAchievementRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Achievement.
struct AchievementRow {
    id: String,
    user_id: String,
    kind: String,
    title: String,
    description: String,
    icon: String,
    unlocked_at: String,
}

impl AchievementRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            kind: row.try_get("type")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            icon: row.try_get("icon")?,
            unlocked_at: row.try_get("unlocked_at")?,
        })
    }

    fn into_achievement(self) -> Result<Achievement, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid achievement id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let unlocked_at = parse_datetime(&self.unlocked_at)?;

        Ok(Achievement {
            id,
            user_id,
            kind: self.kind,
            title: self.title,
            description: self.description,
            icon: self.icon,
            unlocked_at,
        })
    }
}

impl AchievementRepository for SqliteAchievementRepository {
    async fn create_achievement(
        &self,
        achievement: &Achievement,
    ) -> Result<Achievement, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO achievements (id, user_id, type, title, description, icon, unlocked_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(achievement.id.to_string())
        .bind(achievement.user_id.to_string())
        .bind(&achievement.kind)
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.icon)
        .bind(format_datetime(&achievement.unlocked_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(achievement.clone())
    }

    async fn achievements_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<Achievement>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM achievements WHERE user_id = ? ORDER BY unlocked_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut achievements = Vec::with_capacity(rows.len());
        for row in &rows {
            let achievement_row =
                AchievementRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            achievements.push(achievement_row.into_achievement()?);
        }

        Ok(achievements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn insert_user(pool: &DatabasePool) -> Uuid {
        let user_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, streak, total_check_ins, created_at) VALUES (?, ?, 'hash', 0, 0, ?)",
        )
        .bind(user_id.to_string())
        .bind(format!("user-{user_id}"))
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();
        user_id
    }

    fn daily_tracker(user_id: Uuid, days: u32, unlocked_at: chrono::DateTime<Utc>) -> Achievement {
        Achievement {
            id: Uuid::now_v7(),
            user_id,
            kind: "daily-tracker".to_string(),
            title: "Daily Tracker".to_string(),
            description: format!("{days} days in a row"),
            icon: "fas fa-calendar-check".to_string(),
            unlocked_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let pool = test_pool().await;
        let repo = SqliteAchievementRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let base = Utc::now();
        repo.create_achievement(&daily_tracker(user_id, 7, base))
            .await
            .unwrap();
        repo.create_achievement(&daily_tracker(user_id, 14, base + Duration::days(7)))
            .await
            .unwrap();

        let achievements = repo.achievements_for_user(&user_id).await.unwrap();
        assert_eq!(achievements.len(), 2);
        assert_eq!(achievements[0].description, "14 days in a row");
        assert_eq!(achievements[0].kind, "daily-tracker");
        assert_eq!(achievements[1].description, "7 days in a row");
    }

    #[tokio::test]
    async fn test_empty_for_new_user() {
        let pool = test_pool().await;
        let repo = SqliteAchievementRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let achievements = repo.achievements_for_user(&user_id).await.unwrap();
        assert!(achievements.is_empty());
    }
}
