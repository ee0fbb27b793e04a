//! API error types and responses
//!
//! Diagnostic detail is logged here and never written to the response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use grant_core::InteractionResponse;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::dispatch::DispatchError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request signature")]
    InvalidSignature,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body for rejected requests
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "invalid request signature".into(),
                    code: "INVALID_SIGNATURE".into(),
                }),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Interaction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(InteractionResponse::internal_error()),
                )
                    .into_response()
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("Malformed interaction body: {}", err))
    }
}
