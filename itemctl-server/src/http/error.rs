//! API error types with IntoResponse
//!
//! Every failure becomes `{ "success": false, "error": ..., "details"?: ... }`
//! with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::{DbError, PoolError};
use crate::models::{InvalidId, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400)
    Validation(ValidationError),

    /// Path id is not an integer (400)
    InvalidId { raw: String },

    /// Targeted row does not exist (404)
    NotFound { resource: &'static str, id: String },

    /// No database connection available (503, logged)
    Unavailable {
        context: &'static str,
        source: PoolError,
    },

    /// Read or write failed (500, logged)
    Database {
        context: &'static str,
        source: DbError,
    },
}

impl ApiError {
    /// Build a mapper from store errors, tagging server faults with `context`.
    ///
    /// ```ignore
    /// store.get(id).await.map_err(ApiError::db("Failed to fetch item"))?;
    /// ```
    pub fn db(context: &'static str) -> impl FnOnce(DbError) -> Self {
        move |err| match err {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Pool(source) => Self::Unavailable { context, source },
            source => Self::Database { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "success": false,
                "error": e.to_string()
            }),
            Self::InvalidId { raw } => json!({
                "success": false,
                "error": "Invalid ID format",
                "details": format!("'{}' is not an integer", raw)
            }),
            Self::NotFound { resource, id } => json!({
                "success": false,
                "error": format!("{} '{}' not found", resource, id)
            }),
            Self::Unavailable { context, source } => {
                tracing::warn!(error = %source, "{}", context);
                json!({
                    "success": false,
                    "error": context,
                    "details": source.to_string()
                })
            }
            Self::Database { context, source } => {
                tracing::error!(error = %source, "{}", context);
                json!({
                    "success": false,
                    "error": context,
                    "details": source.to_string()
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<InvalidId> for ApiError {
    fn from(e: InvalidId) -> Self {
        Self::InvalidId { raw: e.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Missing { field: "name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "name is required");
    }

    #[tokio::test]
    async fn invalid_id_is_400() {
        let response = ApiError::from(InvalidId("abc".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid ID format");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::db("Failed to fetch item")(DbError::NotFound {
            resource: "item",
            id: "7".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pool_timeout_is_503() {
        let err = ApiError::db("Failed to create item")(DbError::Pool(
            PoolError::AcquisitionTimeout(Duration::from_secs(2)),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn transaction_failure_is_500_with_details() {
        let err = ApiError::db("Failed to update item")(DbError::Transaction(
            sqlx::Error::Protocol("boom".into()),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to update item");
        assert!(body["details"].as_str().unwrap().contains("boom"));
    }
}
