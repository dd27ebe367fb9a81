//! Error types for the resource-access layer
//!
//! Every failure a fetch or mutation can produce surfaces as an [`ApiError`].

use super::types::EventResponse;
use thiserror::Error;

/// Errors returned by [`ApiHttpClient`](super::http::ApiHttpClient) and
/// [`Account`](super::account::Account)
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (DNS, connection, body read)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response whose body decoded as an error envelope
    #[error("got status {status} and error {message:?} when fetching {url}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
        url: String,
        body: String,
    },

    /// Non-2xx response without a decodable error envelope
    #[error("got status {status} when fetching {url}")]
    StatusOnly {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    /// Response body did not match the expected JSON shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rebuild request answered with a non-OK status
    #[error("error rebuilding droplet")]
    RebuildFailed { response: EventResponse },

    /// Destroy request answered with a non-OK status
    #[error("error destroying droplet: {message}")]
    DestroyFailed {
        message: String,
        response: EventResponse,
    },
}

impl ApiError {
    /// Raw response body attached to the error, if the server sent one
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } | ApiError::StatusOnly { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status for remote status errors
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } | ApiError::StatusOnly { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Decoded event response carried by a logical failure
    pub fn event_response(&self) -> Option<&EventResponse> {
        match self {
            ApiError::RebuildFailed { response } | ApiError::DestroyFailed { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }
}

/// Result type alias for resource-access operations
pub type Result<T> = std::result::Result<T, ApiError>;
