//! Error type for the admin backend client.
//!
//! `Display` is the short, user-visible message each panel shows; there are no
//! structured codes beyond the HTTP status.

use reqwest::StatusCode;
use thiserror::Error;

/// Message used when a failed response carries nothing readable.
pub const GENERIC_FAILURE: &str = "Request failed. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network/transport failure (DNS, TLS, connection reset, timeout).
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response; `message` was extracted from the body.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    /// A 2xx body that claimed to be JSON but could not be parsed.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// An authenticated call was attempted without a stored token.
    #[error("Not signed in. Please log in again.")]
    MissingToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Transport("Request timed out. Please try again.".into())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(format!("Network error: {e}"))
        }
    }
}
