//! Typed errors for the content sync library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Only configuration and
//! schema-descriptor failures abort a sync; everything else is caught at
//! the narrowest scope, logged, and recorded in the run report.

use thiserror::Error;

/// Errors that can occur during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required configuration option is absent or blank
    #[error("missing required option: {0}")]
    MissingOption(&'static str),

    /// Schema descriptors could not be read (nothing can proceed)
    #[error("cannot read schema descriptors (check content-manager read permissions): {0}")]
    SchemaAccess(#[source] SourceError),

    /// Source operation failed
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Store operation failed
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur talking to a content source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Download destination could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
