//! Error types for the Google directory provider.

use sunset_directory::ProviderError;
use thiserror::Error;

/// Result type alias using `GoogleError`.
pub type GoogleResult<T> = Result<T, GoogleError>;

/// Errors that can occur when interacting with the Admin SDK.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service account key could not be read or parsed.
    #[error("Invalid service account key: {0}")]
    ServiceAccountKey(String),

    /// Token exchange or assertion signing failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Directory API error.
    #[error("Directory API error: {status} {reason} - {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded{}", retry_after_secs.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT signing error.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<GoogleError> for ProviderError {
    fn from(error: GoogleError) -> Self {
        match error {
            GoogleError::Config(message) | GoogleError::ServiceAccountKey(message) => {
                ProviderError::Configuration { message }
            }
            GoogleError::Url(e) => ProviderError::configuration(e.to_string()),
            GoogleError::Auth(message) => ProviderError::Authentication { message },
            GoogleError::Jwt(e) => ProviderError::Authentication {
                message: e.to_string(),
            },
            GoogleError::Api {
                status,
                reason,
                message,
            } => ProviderError::from_status(status, Some(reason), message, None),
            GoogleError::RateLimited { retry_after_secs } => {
                ProviderError::RateLimited { retry_after_secs }
            }
            GoogleError::Http(e) if e.is_timeout() => ProviderError::Timeout {
                message: e.to_string(),
            },
            GoogleError::Http(e) if e.is_decode() => ProviderError::malformed(e.to_string()),
            GoogleError::Http(e) => ProviderError::network(e.to_string()),
            GoogleError::Json(e) => ProviderError::malformed(e.to_string()),
        }
    }
}
