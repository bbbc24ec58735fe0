//! Error types for the Entra ID provider.

use sunset_directory::ProviderError;
use thiserror::Error;

/// Result type alias using `EntraError`.
pub type EntraResult<T> = Result<T, EntraError>;

/// Errors that can occur when interacting with Entra ID.
#[derive(Debug, Error)]
pub enum EntraError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Microsoft Graph API error.
    #[error("Graph API error: {status} {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded{}", retry_after_secs.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<EntraError> for ProviderError {
    fn from(error: EntraError) -> Self {
        match error {
            EntraError::Config(message) => ProviderError::Configuration { message },
            EntraError::Url(e) => ProviderError::configuration(e.to_string()),
            EntraError::Auth(message) => ProviderError::Authentication { message },
            EntraError::GraphApi {
                status,
                code,
                message,
            } => ProviderError::from_status(status, Some(code), message, None),
            EntraError::RateLimited { retry_after_secs } => {
                ProviderError::RateLimited { retry_after_secs }
            }
            EntraError::Http(e) if e.is_timeout() => ProviderError::Timeout {
                message: e.to_string(),
            },
            EntraError::Http(e) if e.is_decode() => ProviderError::malformed(e.to_string()),
            EntraError::Http(e) => ProviderError::network(e.to_string()),
            EntraError::Json(e) => ProviderError::malformed(e.to_string()),
        }
    }
}
