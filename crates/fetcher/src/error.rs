//! Fetcher Error Types

use thiserror::Error;

/// Errors that can occur while talking to the upstream API
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure before a response was received
    #[error("Upstream request failed: {0}")]
    Request(String),

    /// Upstream answered with a non-success status
    #[error("Upstream API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    /// Whether this error is about the upstream service itself rather than its payload
    pub fn is_upstream(&self) -> bool {
        matches!(self, FetchError::Request(_) | FetchError::Status { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.to_string())
    }
}

impl From<SeriesError> for FetchError {
    fn from(err: SeriesError) -> Self {
        FetchError::MalformedPayload(err.to_string())
    }
}

/// Shape errors in an hourly series
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    /// A metric array is not index-aligned with `time`
    #[error("{metric} has {actual} values but time has {expected}")]
    LengthMismatch {
        metric: &'static str,
        expected: usize,
        actual: usize,
    },
}
