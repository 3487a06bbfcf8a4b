//! Achievement listing handler.
//!
//! GET /api/achievements - The caller's achievements, newest first.

use axum::extract::State;
use axum::Json;

use moodhaven_types::achievement::Achievement;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// GET /api/achievements - The caller's unlocked achievements.
pub async fn list_achievements(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Achievement>>, AppError> {
    let achievements = state.wellness_service.achievements(&auth.user_id).await?;
    Ok(Json(achievements))
}
