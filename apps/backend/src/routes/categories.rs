//! Category endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::CategoryListResponse;
use crate::AppState;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> Result<Json<CategoryListResponse>> {
    let categories = state.db.list_categories().await?;
    Ok(Json(CategoryListResponse { categories }))
}
