//! Client error types.

use meetcoach_notes::NotesError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Notes service error.
    #[error("notes error: {0}")]
    Notes(#[from] NotesError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The analysis service call failed.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Email delivery failed.
    #[error("email delivery failed: {0}")]
    Delivery(String),

    /// Command-line arguments are inconsistent.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}
