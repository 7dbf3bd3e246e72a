//! Error types for notes API operations.
//!
//! Every failure carries a [`NotesErrorCode`] so callers can decide whether
//! a failure is isolated to one item or fatal for the whole run.

use std::fmt;
use thiserror::Error;

/// The category of a notes error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotesErrorCode {
    /// The credential file does not exist.
    CredentialsNotFound,
    /// The credential file exists but holds no usable token pair.
    CredentialsInvalid,
    /// The service rejected our tokens, or the refresh exchange failed.
    AuthenticationFailed,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// The service answered with a non-success status.
    ServerError,
    /// The body was not the JSON we expected.
    InvalidResponse,
    /// A local file could not be written.
    Persistence,
    /// A setting such as an endpoint URL is malformed.
    ConfigurationError,
    /// Unexpected state.
    InternalError,
}

impl NotesErrorCode {
    /// Returns a stable snake_case name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialsNotFound => "credentials_not_found",
            Self::CredentialsInvalid => "credentials_invalid",
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Persistence => "persistence",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Returns true for failures that no later request in the same run can
    /// recover from: bad local configuration or rejected credentials.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            Self::CredentialsNotFound
                | Self::CredentialsInvalid
                | Self::AuthenticationFailed
                | Self::ConfigurationError
        )
    }
}

impl fmt::Display for NotesErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to the notes service.
#[derive(Debug, Error)]
pub struct NotesError {
    code: NotesErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl NotesError {
    /// Creates a new error with the given code and message.
    pub fn new(code: NotesErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a missing-credentials error.
    pub fn credentials_not_found(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::CredentialsNotFound, message)
    }

    /// Creates an unusable-credentials error.
    pub fn credentials_invalid(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::CredentialsInvalid, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::InvalidResponse, message)
    }

    /// Creates a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::Persistence, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(NotesErrorCode::InternalError, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> NotesErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the service rejected our credentials.
    pub fn is_auth(&self) -> bool {
        self.code == NotesErrorCode::AuthenticationFailed
    }

    /// See [`NotesErrorCode::is_fatal_for_run`].
    pub fn is_fatal_for_run(&self) -> bool {
        self.code.is_fatal_for_run()
    }
}

impl fmt::Display for NotesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for notes operations.
pub type NotesResult<T> = Result<T, NotesError>;
