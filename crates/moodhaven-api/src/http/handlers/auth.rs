//! Account registration and login handlers.
//!
//! Endpoints:
//! - POST /api/auth/register - Create an account, returns a bearer token
//! - POST /api/auth/login    - Verify credentials, returns a bearer token
//! - GET  /api/auth/me       - The authenticated caller's account

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use moodhaven_types::user::User;

use crate::http::error::AppError;
use crate::http::extractors::auth::{issue_token, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token plus account, returned by register and login.
///
/// The token is shown exactly once; only its hash is stored.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register - Create an account and issue a token.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .auth_service
        .register(&body.username, &body.password, body.display_name)
        .await?;
    let token = issue_token(&state, user.id).await?;
    Ok(Json(AuthResponse { token, user }))
}

/// POST /api/auth/login - Verify credentials and issue a token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .auth_service
        .login(&body.username, &body.password)
        .await?;
    let token = issue_token(&state, user.id).await?;
    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/auth/me - The authenticated caller's account.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<User>, AppError> {
    let user = state
        .auth_service
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;
    Ok(Json(user))
}
