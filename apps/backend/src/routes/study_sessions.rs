//! Scheduled study session endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{CreateStudySessionRequest, StudySession, StudySessionListResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/study-sessions
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateStudySessionRequest>,
) -> Result<Json<StudySession>> {
    if payload.duration_minutes <= 0 {
        return Err(ApiError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }

    state
        .db
        .get_category(payload.category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("category {}", payload.category_id)))?;

    let session = state.db.create_study_session(auth.user_id, &payload).await?;
    Ok(Json(session))
}

/// GET /api/study-sessions
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<StudySessionListResponse>> {
    let sessions = state.db.list_study_sessions(auth.user_id).await?;
    Ok(Json(StudySessionListResponse { sessions }))
}
