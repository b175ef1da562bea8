//! Aggregate statistics endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use super::DataResponse;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::ItemStats;

/// GET /api/stats
async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<ItemStats>>, ApiError> {
    let stats = state
        .store
        .stats()
        .await
        .map_err(ApiError::db("Failed to fetch statistics"))?;

    Ok(Json(DataResponse::ok(stats)))
}

/// Stats routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/stats", get(stats))
}
