//! Error rendering for the batch endpoint.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use fanout_core::{AdmissionError, BatchError, BatchRequestError};
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not a JSON array of strings, or the batch is too large.
    #[error("{0}")]
    BadRequest(String),

    /// The request body could not be read.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// The batch was aborted.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// The aggregate could not be serialized.
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The admission gate no longer accepts work.
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

impl From<BatchRequestError> for ApiError {
    fn from(err: BatchRequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::BodyRead(message) => {
                error!("Body read error, {}", message);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Batch(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Error: {}", err),
            )
                .into_response(),
            Self::Serialization(err) => {
                error!("Marshaling error, {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Admission(err) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response()
            }
        }
    }
}
