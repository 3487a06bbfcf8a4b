//! Chat session manager.
//!
//! ChatService owns the session lifecycle: start-or-resume, idempotent end,
//! owner-checked lookup, and message recording with server-assigned
//! timestamps. Route-layer authorization goes through `session_for_owner`.

use chrono::Utc;
use moodhaven_types::chat::{ChatMessage, ChatSession, SenderKind};
use moodhaven_types::error::{ChatError, RepositoryError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::repository::ChatRepository;

/// Orchestrates chat session lifecycle and message persistence.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (moodhaven-core never depends on moodhaven-infra).
pub struct ChatService<C: ChatRepository> {
    chat_repo: C,
}

impl<C: ChatRepository> ChatService<C> {
    /// Create a new chat service with the given repository.
    pub fn new(chat_repo: C) -> Self {
        Self { chat_repo }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    // --- Session lifecycle ---

    /// Return the user's currently-active session, creating one if none exists.
    ///
    /// The one-active-session-per-user invariant is enforced by the store's
    /// partial unique index: when two first-session requests race, the loser's
    /// insert conflicts and we return the winner's row instead.
    pub async fn start_or_resume_session(&self, user_id: Uuid) -> Result<ChatSession, ChatError> {
        if let Some(existing) = self.chat_repo.get_active_session(&user_id).await? {
            return Ok(existing);
        }

        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id,
            counselor_id: None,
            is_active: true,
            created_at: Utc::now(),
            ended_at: None,
        };

        match self.chat_repo.create_session(&session).await {
            Ok(created) => {
                info!(session_id = %created.id, user_id = %user_id, "Chat session created");
                Ok(created)
            }
            Err(RepositoryError::Conflict(_)) => {
                // Lost a creation race; the winner's session is the active one.
                self.chat_repo
                    .get_active_session(&user_id)
                    .await?
                    .ok_or(ChatError::SessionNotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a session by ID, failing with `SessionNotFound` when absent.
    pub async fn get_session(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        self.chat_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)
    }

    /// Get a session and verify the requesting user owns it.
    ///
    /// Callers returning message content must go through this accessor;
    /// non-owners learn nothing beyond the refusal.
    pub async fn session_for_owner(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<ChatSession, ChatError> {
        let session = self.get_session(session_id).await?;
        if session.user_id != *user_id {
            return Err(ChatError::Forbidden);
        }
        Ok(session)
    }

    /// End a session. Idempotent: ending an already-ended or unknown
    /// session is a silent no-op, and `ended_at` is only ever set once.
    pub async fn end_session(&self, session_id: &Uuid) -> Result<(), ChatError> {
        self.chat_repo.end_session(session_id, Utc::now()).await?;
        info!(session_id = %session_id, "Chat session ended");
        Ok(())
    }

    // --- Messages ---

    /// All messages for a session, oldest first.
    pub async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.chat_repo.get_messages(session_id, None, None).await?)
    }

    /// Persist a message into an active session with a server-assigned
    /// timestamp, returning the stored record.
    ///
    /// Messages into ended or unknown sessions are rejected.
    pub async fn record_message(
        &self,
        session_id: Uuid,
        sender_id: Option<Uuid>,
        sender_type: SenderKind,
        message: String,
    ) -> Result<ChatMessage, ChatError> {
        let session = self
            .chat_repo
            .get_session(&session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;

        if !session.is_active {
            warn!(session_id = %session_id, "Message rejected: session has ended");
            return Err(ChatError::SessionClosed);
        }

        let record = ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            sender_id,
            sender_type,
            message,
            created_at: Utc::now(),
        };
        self.chat_repo.save_message(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory ChatRepository mirroring the store's partial unique index.
    #[derive(Default)]
    struct MemoryChatRepository {
        sessions: Mutex<Vec<ChatSession>>,
        messages: Mutex<Vec<ChatMessage>>,
    }

    impl ChatRepository for MemoryChatRepository {
        async fn create_session(
            &self,
            session: &ChatSession,
        ) -> Result<ChatSession, RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            if session.is_active
                && sessions
                    .iter()
                    .any(|s| s.user_id == session.user_id && s.is_active)
            {
                return Err(RepositoryError::Conflict(
                    "an active session already exists for this user".to_string(),
                ));
            }
            sessions.push(session.clone());
            Ok(session.clone())
        }

        async fn get_session(
            &self,
            session_id: &Uuid,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == *session_id)
                .cloned())
        }

        async fn get_active_session(
            &self,
            user_id: &Uuid,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.user_id == *user_id && s.is_active)
                .cloned())
        }

        async fn end_session(
            &self,
            session_id: &Uuid,
            ended_at: chrono::DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            if let Some(s) = sessions
                .iter_mut()
                .find(|s| s.id == *session_id && s.is_active)
            {
                s.is_active = false;
                s.ended_at = Some(ended_at);
            }
            Ok(())
        }

        async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn get_messages(
            &self,
            session_id: &Uuid,
            _limit: Option<i64>,
            _offset: Option<i64>,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            let mut messages: Vec<ChatMessage> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.session_id == *session_id)
                .cloned()
                .collect();
            messages.sort_by_key(|m| m.created_at);
            Ok(messages)
        }

        async fn count_sessions(&self) -> Result<u64, RepositoryError> {
            Ok(self.sessions.lock().unwrap().len() as u64)
        }

        async fn count_messages(&self) -> Result<u64, RepositoryError> {
            Ok(self.messages.lock().unwrap().len() as u64)
        }
    }

    fn service() -> ChatService<MemoryChatRepository> {
        ChatService::new(MemoryChatRepository::default())
    }

    #[tokio::test]
    async fn start_or_resume_creates_then_resumes() {
        let svc = service();
        let user = Uuid::now_v7();

        let first = svc.start_or_resume_session(user).await.unwrap();
        assert!(first.is_active);
        assert_eq!(first.user_id, user);
        assert!(first.counselor_id.is_none());

        // Second request returns the same session, not a new one.
        let second = svc.start_or_resume_session(user).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(svc.chat_repo().count_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn at_most_one_active_session_per_user() {
        let svc = service();
        let user = Uuid::now_v7();

        let first = svc.start_or_resume_session(user).await.unwrap();
        svc.end_session(&first.id).await.unwrap();

        // A new session may be created once the first has ended.
        let second = svc.start_or_resume_session(user).await.unwrap();
        assert_ne!(second.id, first.id);

        let active = svc.chat_repo().get_active_session(&user).await.unwrap();
        assert_eq!(active.unwrap().id, second.id);
    }

    #[tokio::test]
    async fn end_session_is_idempotent() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.start_or_resume_session(user).await.unwrap();

        svc.end_session(&session.id).await.unwrap();
        let after_first = svc.get_session(&session.id).await.unwrap();
        assert!(!after_first.is_active);
        let ended_at = after_first.ended_at.unwrap();

        // Ending again changes nothing, including the timestamp.
        svc.end_session(&session.id).await.unwrap();
        let after_second = svc.get_session(&session.id).await.unwrap();
        assert!(!after_second.is_active);
        assert_eq!(after_second.ended_at, Some(ended_at));
    }

    #[tokio::test]
    async fn end_unknown_session_is_a_no_op() {
        let svc = service();
        svc.end_session(&Uuid::now_v7()).await.unwrap();
    }

    #[tokio::test]
    async fn get_session_not_found() {
        let svc = service();
        let err = svc.get_session(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }

    #[tokio::test]
    async fn session_for_owner_refuses_non_owner() {
        let svc = service();
        let owner = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let session = svc.start_or_resume_session(owner).await.unwrap();

        let err = svc
            .session_for_owner(&session.id, &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Forbidden));

        let ok = svc.session_for_owner(&session.id, &owner).await.unwrap();
        assert_eq!(ok.id, session.id);
    }

    #[tokio::test]
    async fn record_message_rejects_ended_session() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.start_or_resume_session(user).await.unwrap();
        svc.end_session(&session.id).await.unwrap();

        let err = svc
            .record_message(session.id, Some(user), SenderKind::User, "late".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionClosed));
        assert_eq!(svc.chat_repo().count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_message_round_trips_fields() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.start_or_resume_session(user).await.unwrap();

        let recorded = svc
            .record_message(
                session.id,
                Some(user),
                SenderKind::User,
                "hello".to_string(),
            )
            .await
            .unwrap();

        let fetched = svc.get_messages(&session.id).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].sender_id, recorded.sender_id);
        assert_eq!(fetched[0].sender_type, recorded.sender_type);
        assert_eq!(fetched[0].message, "hello");
    }

    #[tokio::test]
    async fn messages_ordered_by_created_at() {
        let svc = service();
        let user = Uuid::now_v7();
        let session = svc.start_or_resume_session(user).await.unwrap();

        for i in 0..3 {
            svc.record_message(session.id, Some(user), SenderKind::User, format!("m{i}"))
                .await
                .unwrap();
        }

        let messages = svc.get_messages(&session.id).await.unwrap();
        assert_eq!(messages.len(), 3);
        for pair in messages.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }
}
