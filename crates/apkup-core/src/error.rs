//! Publishing error types

use thiserror::Error;

/// Publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Malformed or missing local input, detected before any remote call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or malformed credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failure returned by the publishing API
    #[error("Remote error: {status} - {message}")]
    Remote { status: u16, message: String },

    /// An edit session was driven out of order
    #[error("Invalid edit usage: {0}")]
    Usage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Coarse classification of a [`PublishError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Remote,
    Usage,
    Internal,
}

impl PublishError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(_) | Self::Jwt(_) => ErrorKind::Auth,
            // transport failures surface from the remote side of the call
            Self::Remote { .. } | Self::Http(_) => ErrorKind::Remote,
            Self::Usage(_) => ErrorKind::Usage,
            Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for publishing operations
pub type Result<T> = std::result::Result<T, PublishError>;
