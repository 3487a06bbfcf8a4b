//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `moodhaven-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader for SELECTs,
//! writer for mutations.

use moodhaven_core::repository::user::UserRepository;
use moodhaven_types::error::RepositoryError;
use moodhaven_types::user::User;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain User.
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    display_name: Option<String>,
    streak: i64,
    total_check_ins: i64,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            display_name: row.try_get("display_name")?,
            streak: row.try_get("streak")?,
            total_check_ins: row.try_get("total_check_ins")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            display_name: self.display_name,
            streak: self.streak as u32,
            total_check_ins: self.total_check_ins as u32,
            created_at,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO users (id, username, password_hash, display_name, streak, total_check_ins, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.streak as i64)
        .bind(user.total_check_ins as i64)
        .bind(format_datetime(&user.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("username '{}' already exists", user.username))
            }
            _ => RepositoryError::Query(e.to_string()),
        })?;

        Ok(user.clone())
    }

    async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn update_streak(&self, user_id: &Uuid, streak: u32) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET streak = ?, total_check_ins = total_check_ins + 1 WHERE id = ?",
        )
        .bind(streak as i64)
        .bind(user_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_user(username: &str) -> User {
        User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            display_name: Some(username.to_string()),
            streak: 0,
            total_check_ins: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let user = make_user("ada");
        let created = repo.create_user(&user).await.unwrap();
        assert_eq!(created.id, user.id);

        let found = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(found.username, "ada");
        assert_eq!(found.password_hash, user.password_hash);
        assert_eq!(found.streak, 0);

        let by_name = repo.get_user_by_username("ada").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let missing = repo.get_user_by_username("nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        repo.create_user(&make_user("ada")).await.unwrap();
        let err = repo.create_user(&make_user("ada")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_streak_bumps_check_ins() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let user = make_user("grace");
        repo.create_user(&user).await.unwrap();

        repo.update_streak(&user.id, 1).await.unwrap();
        repo.update_streak(&user.id, 2).await.unwrap();

        let found = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(found.streak, 2);
        assert_eq!(found.total_check_ins, 2);
    }

    #[tokio::test]
    async fn test_update_streak_unknown_user() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let err = repo.update_streak(&Uuid::now_v7(), 1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_count_users() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        assert_eq!(repo.count_users().await.unwrap(), 0);
        repo.create_user(&make_user("ada")).await.unwrap();
        repo.create_user(&make_user("grace")).await.unwrap();
        assert_eq!(repo.count_users().await.unwrap(), 2);
    }
}
