//! Engine-to-HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drivewise_core::EngineError;
use serde_json::json;

/// Wraps [`EngineError`] so every handler returns a structured JSON error
/// payload with a status code matching the error kind.
#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            EngineError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.0.to_string() }),
            ),
            EngineError::InsufficientBalance {
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Insufficient tokens",
                    "tokens_available": available,
                    "requested": requested,
                }),
            ),
            EngineError::NotQualified {
                total_trips,
                needed,
            } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.0.to_string(),
                    "total_trips": total_trips,
                    "needed_entries": needed,
                }),
            ),
            EngineError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.0.to_string() }),
            ),
            EngineError::BlockchainUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": "Blockchain not connected",
                    "blockchain_status": "disconnected",
                }),
            ),
            EngineError::Storage(detail) => {
                tracing::error!(error = %detail, "request failed on storage");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
