//! Study timer endpoints
//!
//! Timer state lives server-side; the client only holds the timer id.
//! A partial unique index guarantees at most one running timer per user.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{StartTimerRequest, StartTimerResponse, StopTimerResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/timers
pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<Option<StartTimerRequest>>,
) -> Result<Json<StartTimerResponse>> {
    let payload = payload.unwrap_or_default();

    if let Some(session_id) = payload.study_session_id {
        let session = state
            .db
            .get_study_session(session_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("study session {session_id}")))?;
        if session.user_id != auth.user_id {
            return Err(ApiError::NotFound(format!("study session {session_id}")));
        }
    }

    let timer = state
        .db
        .start_timer(auth.user_id, payload.category_id, payload.study_session_id)
        .await?;

    Ok(Json(StartTimerResponse {
        timer_id: timer.id,
        started_at: timer.started_at,
    }))
}

/// POST /api/timers/:id/stop
pub async fn stop(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(timer_id): Path<Uuid>,
) -> Result<Json<StopTimerResponse>> {
    let timer = state.db.stop_timer(timer_id, auth.user_id).await?;

    let stopped_at = timer
        .stopped_at
        .ok_or_else(|| ApiError::Internal("stopped timer has no stop time".to_string()))?;
    let duration_secs = (stopped_at - timer.started_at).num_milliseconds() as f64 / 1000.0;

    Ok(Json(StopTimerResponse {
        timer_id: timer.id,
        duration_secs,
    }))
}
