//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - POST /api/chat/session               - Resume the caller's active session or start one
//! - POST /api/chat/session/{id}/end      - Owner-checked idempotent end
//! - GET  /api/chat/messages/{sessionId}  - Session history, oldest first (owner only)

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use moodhaven_types::chat::{ChatMessage, ChatSession};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid session id: {s}")))
}

/// POST /api/chat/session - The caller's active session, created if absent.
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ChatSession>, AppError> {
    let session = state
        .chat_service
        .start_or_resume_session(auth.user_id)
        .await?;
    Ok(Json(session))
}

/// POST /api/chat/session/{id}/end - End the caller's session.
///
/// Idempotent: ending an already-ended session returns the same final state.
pub async fn end_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<ChatSession>, AppError> {
    let sid = parse_uuid(&session_id)?;

    state
        .chat_service
        .session_for_owner(&sid, &auth.user_id)
        .await?;
    state.chat_service.end_session(&sid).await?;

    let session = state.chat_service.get_session(&sid).await?;
    Ok(Json(session))
}

/// GET /api/chat/messages/{sessionId} - Session history, oldest first.
///
/// Refused with 403 for callers who do not own the session; no message
/// content is returned.
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let sid = parse_uuid(&session_id)?;

    state
        .chat_service
        .session_for_owner(&sid, &auth.user_id)
        .await?;

    let messages = state.chat_service.get_messages(&sid).await?;
    Ok(Json(messages))
}
