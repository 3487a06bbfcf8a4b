//! Bearer token authentication extractor.
//!
//! Extracts and verifies tokens from:
//! - `Authorization: Bearer <token>` header
//! - `X-API-Token: <token>` header
//!
//! Tokens are SHA-256 hashed and compared against the `api_tokens` table.
//! The `/ws` upgrade additionally accepts `?token=` in the query string,
//! since browsers cannot set headers on WebSocket handshakes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated request marker carrying the verified user's id.
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let user_id = lookup_token(state, &token).await?;
        Ok(AuthUser { user_id })
    }
}

/// Extract the bearer token from request headers.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    // Try Authorization: Bearer <token>
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    // Try X-API-Token header
    if let Some(token) = parts.headers.get("x-api-token") {
        let token_str = token.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Token header encoding".to_string())
        })?;
        return Ok(token_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing token. Provide via 'Authorization: Bearer <token>' or 'X-API-Token: <token>' header.".to_string(),
    ))
}

/// Resolve a plaintext token to the user it authenticates.
pub async fn lookup_token(state: &AppState, token: &str) -> Result<Uuid, AppError> {
    let token_hash = hash_token(token);

    let result = sqlx::query("SELECT id, user_id FROM api_tokens WHERE token_hash = ?")
        .bind(&token_hash)
        .fetch_optional(&state.db_pool.reader)
        .await
        .map_err(|e| AppError::Internal(format!("Database error: {e}")))?;

    match result {
        Some(row) => {
            // Update last_used_at (best effort, don't fail the request)
            let id: String = row.get("id");
            let now = chrono::Utc::now().to_rfc3339();
            let _ = sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE id = ?")
                .bind(&now)
                .bind(&id)
                .execute(&state.db_pool.writer)
                .await;

            let user_id: String = row.get("user_id");
            user_id
                .parse()
                .map_err(|_| AppError::Internal("Corrupt token record".to_string()))
        }
        None => Err(AppError::Unauthorized("Invalid token".to_string())),
    }
}

/// Compute SHA-256 hash of a token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// Generate a fresh token for a user and store its hash.
///
/// Returns the plaintext token, shown to the client exactly once.
pub async fn issue_token(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    use aes_gcm::aead::{rand_core::RngCore, OsRng};
    let mut token_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut token_bytes);
    let plaintext_token = format!(
        "mhvn_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    let token_hash = hash_token(&plaintext_token);
    let id = Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO api_tokens (id, user_id, token_hash, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(user_id.to_string())
        .bind(&token_hash)
        .bind(&now)
        .execute(&state.db_pool.writer)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store token: {e}")))?;

    Ok(plaintext_token)
}
