//! Errors raised while issuing a request or reading its response.
//!
//! `Display` yields the underlying message verbatim so callers can surface it
//! without rewriting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, TLS, timeout, body read).
    #[error("{0}")]
    Transport(String),
    /// The response body was not valid JSON.
    #[error("{0}")]
    Decode(String),
    /// The request could not be built (e.g. an unparseable MIME type).
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
