//! Dashboard endpoints
//!
//! Pure read-side rollups over performance and test history; nothing here
//! mutates state.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;
use quiz_core::stats;

const DEFAULT_PROGRESS_DAYS: u32 = 7;

/// GET /api/dashboard/summary
pub async fn summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardSummaryResponse>> {
    let summary = state.db.get_dashboard_summary(auth.user_id).await?;
    Ok(Json(summary))
}

/// GET /api/dashboard/categories
pub async fn categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<CategoryStatsResponse>> {
    let categories = state.db.get_category_stats(auth.user_id).await?;
    Ok(Json(CategoryStatsResponse { categories }))
}

/// GET /api/dashboard/daily
pub async fn daily(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<DailyProgressQuery>,
) -> Result<Json<DailyProgressResponse>> {
    let days = query.days.unwrap_or(DEFAULT_PROGRESS_DAYS);
    let progress = state.db.get_daily_progress(auth.user_id, days).await?;
    Ok(Json(DailyProgressResponse { days: progress }))
}

/// GET /api/dashboard/weak-areas
pub async fn weak_areas(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<WeakAreasQuery>,
) -> Result<Json<WeakAreasResponse>> {
    let rows = state
        .db
        .get_user_performance(auth.user_id, query.category_id)
        .await?;

    let records = rows.iter().map(|r| r.to_question_performance()).collect();
    let by_id: HashMap<i64, &PerformanceRow> = rows.iter().map(|r| (r.question_id, r)).collect();

    let ordered = stats::weak_areas(records, stats::DEFAULT_WEAK_THRESHOLD, Utc::now());

    let weak_areas = ordered
        .iter()
        .filter_map(|p| by_id.get(&p.question_id))
        .map(|r| WeakArea {
            question_id: r.question_id,
            question_text: r.question_text.clone(),
            category: r.category.clone(),
            accuracy: stats::accuracy(r.correct_count as u32, r.attempts as u32),
            attempts: r.attempts,
            next_review: r.next_review,
        })
        .collect();

    Ok(Json(WeakAreasResponse { weak_areas }))
}

/// GET /api/dashboard/challenging
pub async fn challenging(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<ChallengingQuery>,
) -> Result<Json<ChallengingResponse>> {
    let min_attempts = query.min_attempts.unwrap_or(stats::DEFAULT_MIN_SAMPLE);

    let rows = state.db.get_user_performance(auth.user_id, None).await?;

    let records = rows.iter().map(|r| r.to_question_performance()).collect();
    let by_id: HashMap<i64, &PerformanceRow> = rows.iter().map(|r| (r.question_id, r)).collect();

    let ranked = stats::challenging(records, min_attempts);

    let questions = ranked
        .iter()
        .filter_map(|p| by_id.get(&p.question_id))
        .map(|r| ChallengingQuestion {
            question_id: r.question_id,
            question_text: r.question_text.clone(),
            category: r.category.clone(),
            accuracy: stats::accuracy(r.correct_count as u32, r.attempts as u32),
            attempts: r.attempts,
        })
        .collect();

    Ok(Json(ChallengingResponse { questions }))
}
