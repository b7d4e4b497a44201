//! API error type and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fetcher::{FetchError, SeriesError};
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;

/// Errors returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed upstream payload: {0}")]
    MalformedUpstream(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// JSON body of an error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::MalformedUpstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::Upstream(_) => "UpstreamError",
            ApiError::MalformedUpstream(_) => "MalformedUpstreamPayload",
            ApiError::Storage(_) => "StorageError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ApiError::Storage(_) => {
                tracing::error!(error = %self, "Storage failure");
                "An internal error occurred".to_string()
            }
            ApiError::Upstream(_) | ApiError::MalformedUpstream(_) => {
                tracing::warn!(error = %self, "Upstream failure");
                self.to_string()
            }
            ApiError::NotFound(_) => {
                tracing::debug!(error = %self, "Not found");
                self.to_string()
            }
        };

        let body = ErrorResponse {
            error: self.error_type(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        if err.is_upstream() {
            ApiError::Upstream(err.to_string())
        } else {
            ApiError::MalformedUpstream(err.to_string())
        }
    }
}

impl From<SeriesError> for ApiError {
    fn from(err: SeriesError) -> Self {
        ApiError::MalformedUpstream(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(date) => {
                ApiError::NotFound(format!("No air quality data stored for {}", date))
            }
            StorageError::DatabaseError(_) => ApiError::Storage(err.to_string()),
        }
    }
}
