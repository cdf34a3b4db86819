//! Reverie API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reverie_core::error::CoherenceError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable or config file is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `CoherenceError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub CoherenceError);

impl From<CoherenceError> for ApiError {
    fn from(err: CoherenceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            CoherenceError::InputValidation(_) => (StatusCode::BAD_REQUEST, "input_validation_error"),
            CoherenceError::ResolutionRejected(_) => (StatusCode::CONFLICT, "resolution_rejected"),
            CoherenceError::RetroactiveChangeConflict { .. } => {
                (StatusCode::CONFLICT, "retroactive_change_conflict")
            }
            CoherenceError::DetectionStrategy { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "detection_strategy_error")
            }
            CoherenceError::Transaction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "transaction_error"),
            CoherenceError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
