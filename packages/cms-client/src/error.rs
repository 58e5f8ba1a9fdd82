//! Typed errors for the CMS client.

use thiserror::Error;

/// Errors returned by [`CmsClient`](crate::CmsClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured API URL (or a path joined onto it) is not a valid URL.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Transport-level failure (connection, timeout, body decoding).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Writing a downloaded payload to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
