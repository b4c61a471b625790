//! Remote client error types.

use thiserror::Error;

/// Result type alias for remote calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Transport, auth, and protocol failures talking to the remote platform.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("object storage error: {0}")]
    Storage(String),
}
