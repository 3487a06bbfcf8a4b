//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `moodhaven-core` using sqlx with split
//! read/write pools. The one-active-session-per-user invariant lives in the
//! schema as a partial unique index; creation races surface here as
//! `RepositoryError::Conflict`.

use chrono::{DateTime, Utc};
use moodhaven_core::chat::repository::ChatRepository;
use moodhaven_types::chat::{ChatMessage, ChatSession, SenderKind};
use moodhaven_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    user_id: String,
    counselor_id: Option<String>,
    is_active: i64,
    created_at: String,
    ended_at: Option<String>,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            counselor_id: row.try_get("counselor_id")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            ended_at: row.try_get("ended_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let counselor_id = self
            .counselor_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid counselor_id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let ended_at = self.ended_at.as_deref().map(parse_datetime).transpose()?;

        Ok(ChatSession {
            id,
            user_id,
            counselor_id,
            is_active: self.is_active != 0,
            created_at,
            ended_at,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    id: String,
    session_id: String,
    sender_id: Option<String>,
    sender_type: String,
    message: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            sender_id: row.try_get("sender_id")?,
            sender_type: row.try_get("sender_type")?,
            message: row.try_get("message")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let sender_id = self
            .sender_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid sender_id: {e}")))?;
        let sender_type: SenderKind = self
            .sender_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ChatMessage {
            id,
            session_id,
            sender_id,
            sender_type,
            message: self.message,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, counselor_id, is_active, created_at, ended_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.counselor_id.map(|id| id.to_string()))
        .bind(session.is_active as i64)
        .bind(format_datetime(&session.created_at))
        .bind(session.ended_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict(
                "an active session already exists for this user".to_string(),
            ),
            _ => RepositoryError::Query(e.to_string()),
        })?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn get_active_session(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM chat_sessions WHERE user_id = ? AND is_active = 1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn end_session(
        &self,
        session_id: &Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        // Conditional on is_active so ended_at is written exactly once;
        // already-ended and unknown sessions are a no-op.
        sqlx::query(
            "UPDATE chat_sessions SET is_active = 0, ended_at = ? WHERE id = ? AND is_active = 1",
        )
        .bind(format_datetime(&ended_at))
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, sender_id, sender_type, message, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.sender_id.map(|id| id.to_string()))
        .bind(message.sender_type.to_string())
        .bind(&message.message)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut sql =
            String::from("SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC");

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages")
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
    use chrono::Duration;

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

    fn make_session(user_id: Uuid) -> ChatSession {
        ChatSession {
            id: Uuid::now_v7(),
            user_id,
            counselor_id: None,
            is_active: true,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    fn make_message(session_id: Uuid, sender_id: Option<Uuid>, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            sender_id,
            sender_type: SenderKind::User,
            message: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let session = make_session(user_id);
        let created = repo.create_session(&session).await.unwrap();
        assert_eq!(created.id, session.id);
        assert!(created.is_active);

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, user_id);
        assert!(found.counselor_id.is_none());
        assert!(found.ended_at.is_none());
    }

    #[tokio::test]
    async fn test_active_session_unique_per_user() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        repo.create_session(&make_session(user_id)).await.unwrap();

        // The partial unique index rejects a second active session.
        let err = repo
            .create_session(&make_session(user_id))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_end_session_sets_ended_at_once() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let session = make_session(user_id);
        repo.create_session(&session).await.unwrap();

        let first_end = Utc::now();
        repo.end_session(&session.id, first_end).await.unwrap();

        let after_first = repo.get_session(&session.id).await.unwrap().unwrap();
        assert!(!after_first.is_active);
        let recorded = after_first.ended_at.unwrap();

        // A later end call must not move the timestamp.
        repo.end_session(&session.id, first_end + Duration::hours(1))
            .await
            .unwrap();
        let after_second = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(after_second.ended_at, Some(recorded));
    }

    #[tokio::test]
    async fn test_end_unknown_session_is_no_op() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        repo.end_session(&Uuid::now_v7(), Utc::now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_ended_session_allows_new_one() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let first = make_session(user_id);
        repo.create_session(&first).await.unwrap();
        repo.end_session(&first.id, Utc::now()).await.unwrap();

        let second = make_session(user_id);
        repo.create_session(&second).await.unwrap();

        let active = repo.get_active_session(&user_id).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn test_messages_ordered_by_created_at() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let session = make_session(user_id);
        repo.create_session(&session).await.unwrap();

        // Insert out of chronological order; the query must sort.
        let base = Utc::now();
        for (offset, content) in [(2, "third"), (0, "first"), (1, "second")] {
            let msg = ChatMessage {
                created_at: base + Duration::seconds(offset),
                ..make_message(session.id, Some(user_id), content)
            };
            repo.save_message(&msg).await.unwrap();
        }

        let messages = repo.get_messages(&session.id, None, None).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].message, "first");
        assert_eq!(messages[1].message, "second");
        assert_eq!(messages[2].message, "third");
        for pair in messages.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_message_round_trip() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        let session = make_session(user_id);
        repo.create_session(&session).await.unwrap();

        let system_msg = ChatMessage {
            sender_type: SenderKind::System,
            ..make_message(session.id, None, "counselor joined")
        };
        repo.save_message(&system_msg).await.unwrap();

        let messages = repo.get_messages(&session.id, None, None).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender_id, None);
        assert_eq!(messages[0].sender_type, SenderKind::System);
        assert_eq!(messages[0].message, "counselor joined");
    }

    #[tokio::test]
    async fn test_counts() {
        let pool = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let user_id = insert_user(&pool).await;

        assert_eq!(repo.count_sessions().await.unwrap(), 0);
        assert_eq!(repo.count_messages().await.unwrap(), 0);

        let session = make_session(user_id);
        repo.create_session(&session).await.unwrap();
        repo.save_message(&make_message(session.id, Some(user_id), "hi"))
            .await
            .unwrap();

        assert_eq!(repo.count_sessions().await.unwrap(), 1);
        assert_eq!(repo.count_messages().await.unwrap(), 1);
    }
}
