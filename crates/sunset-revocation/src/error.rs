//! Error types for the revocation engine.

use thiserror::Error;

/// Result type alias using `ChangeSourceError`.
pub type ChangeSourceResult<T> = Result<T, ChangeSourceError>;

/// Failure talking to the change-tracking system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeSourceError {
    /// The source could not be reached or timed out.
    #[error("change source unavailable: {0}")]
    Unavailable(String),

    /// The referenced change does not exist.
    #[error("change {0} not found")]
    NotFound(String),

    /// The source answered with a body we could not interpret.
    #[error("malformed change source response: {0}")]
    Malformed(String),

    /// Unexpected HTTP status.
    #[error("change source returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The client could not be set up (bad base URL, TLS backend, ...).
    #[error("change source configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ChangeSourceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ChangeSourceError::Malformed(error.to_string())
        } else {
            ChangeSourceError::Unavailable(error.to_string())
        }
    }
}

/// Pass-level failure. Everything else is reported per grant.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The list of active grants could not be obtained, so there is nothing
    /// to report outcomes for.
    #[error("active grants unavailable: {0}")]
    GrantListUnavailable(#[source] ChangeSourceError),

    /// The coordinator was configured with unusable limits.
    #[error("invalid coordinator configuration: {0}")]
    InvalidConfig(String),
}
