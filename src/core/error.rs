use thiserror::Error;

use crate::merge::MergeError;

/// The primary error type for all fallible operations of an extraction cycle.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The server rejected the session token (HTTP 401).
    #[error("Session rejected by {url}")]
    Unauthorized {
        /// The URL that rejected the request.
        url: String,
    },

    /// The login exchange did not produce a usable session token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The data received from the source was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// The merge engine could not assemble the frame.
    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    /// Columnar encoding failed.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Local I/O failed (file sink).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// `true` when the error means the cached session must be dropped.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ExtractError::Unauthorized { .. })
    }

    /// `true` for network-level failures that are expected to clear up on their own.
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractError::Http(_) | ExtractError::Io(_) | ExtractError::Unauthorized { .. } => true,
            ExtractError::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}
