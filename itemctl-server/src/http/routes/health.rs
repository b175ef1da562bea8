//! Health check endpoint
//!
//! Always answers with a JSON body. A database fault turns into
//! `status: "Error"` with HTTP 500 instead of an unhandled failure.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::server::AppState;
use crate::models::PoolStats;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pool: PoolStats,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let pool = state.store.pool_stats();
    let base = HealthResponse {
        status: "OK",
        database: "Connected",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        db_time: None,
        latency_ms: None,
        db_version: None,
        item_count: None,
        error: None,
        pool,
    };

    match state.store.diagnostics().await {
        Ok(diag) => (
            StatusCode::OK,
            Json(HealthResponse {
                db_time: Some(diag.server_time),
                latency_ms: Some(diag.latency_ms),
                db_version: Some(diag.version),
                item_count: Some(diag.item_count),
                ..base
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "Error",
                    database: "Disconnected",
                    error: Some(e.to_string()),
                    ..base
                }),
            )
        }
    }
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn health_returns_ok() {
        let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())));
        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "OK");
        assert_eq!(body.item_count, Some(0));
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn unreachable_store_reports_error() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let state = Arc::new(AppState::new(store));

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, "Error");
        assert_eq!(body.database, "Disconnected");
        assert!(body.error.unwrap().contains("unreachable"));
    }
}
