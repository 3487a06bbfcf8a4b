//! Mood check-in handlers.
//!
//! Endpoints:
//! - POST /api/mood         - Record a check-in (streak, crisis, achievement side effects)
//! - GET  /api/mood/history - Recent entries, newest first
//! - GET  /api/mood/today   - Most recent entry since local midnight, or null

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use moodhaven_types::mood::{MoodEntry, MoodKind};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub mood_level: i32,
    pub mood_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for mood history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// POST /api/mood - Record a mood check-in.
pub async fn create_mood(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CheckInRequest>,
) -> Result<Json<MoodEntry>, AppError> {
    let mood_type: MoodKind = body
        .mood_type
        .parse()
        .map_err(AppError::Validation)?;

    let outcome = state
        .wellness_service
        .record_check_in(auth.user_id, body.mood_level, mood_type, body.notes)
        .await?;

    Ok(Json(outcome.entry))
}

/// GET /api/mood/history - The caller's recent entries, newest first.
pub async fn mood_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MoodEntry>>, AppError> {
    let entries = state
        .wellness_service
        .mood_history(&auth.user_id, query.limit)
        .await?;
    Ok(Json(entries))
}

/// GET /api/mood/today - The caller's entry for today, or null.
pub async fn mood_today(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Option<MoodEntry>>, AppError> {
    let entry = state.wellness_service.today_entry(&auth.user_id).await?;
    Ok(Json(entry))
}
