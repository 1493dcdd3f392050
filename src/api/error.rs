//! API error types with JSON response bodies.
//!
//! Bodies stay flat for the browser frontend, which displays the field
//! verbatim: failures carry `{"error": ...}`, absent resources carry
//! `{"message": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DatabaseError;
use crate::model_client::ModelClientError;

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Model service unreachable or unhealthy (health proxy path).
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, json!({ "error": message })),
            ApiError::Internal(message) => {
                tracing::error!(detail = %message, "API internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ModelClientError> for ApiError {
    fn from(err: ModelClientError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
