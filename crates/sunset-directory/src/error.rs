//! Provider error types
//!
//! Genuine provider or network faults. "Not found" is deliberately absent
//! from this enum: it is a normal result carried by [`crate::Lookup`] and
//! [`crate::Removal`], never an error.

use serde::Serialize;
use thiserror::Error;

/// Fault reported by an identity provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderError {
    /// The provider rejected our credentials or token acquisition failed.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Authenticated, but not allowed to perform the operation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The provider throttled the request.
    #[error("rate limited{}", retry_after_secs.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited {
        #[serde(skip_serializing_if = "Option::is_none")]
        retry_after_secs: Option<u64>,
    },

    /// Unexpected HTTP status from the provider API.
    #[error("provider returned HTTP {status}{}: {message}", code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Http {
        status: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network { message: String },

    /// The request exceeded the client-side timeout.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The provider answered with a body we could not interpret.
    #[error("malformed provider response: {message}")]
    MalformedResponse { message: String },

    /// The client is misconfigured (bad URL, invalid key material, ...).
    #[error("provider configuration error: {message}")]
    Configuration { message: String },
}

impl ProviderError {
    /// Classifies a non-success, non-404 HTTP status.
    ///
    /// `code` is the provider's own error code when the body carried one.
    pub fn from_status(
        status: u16,
        code: Option<String>,
        message: impl Into<String>,
        retry_after_secs: Option<u64>,
    ) -> Self {
        let message = message.into();
        match status {
            401 => ProviderError::Authentication { message },
            403 => ProviderError::PermissionDenied { message },
            429 => ProviderError::RateLimited { retry_after_secs },
            _ => ProviderError::Http {
                status,
                code,
                message,
            },
        }
    }

    /// Check if this error is transient, so that a caller above the pass
    /// boundary may try again later.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. }
            | ProviderError::Network { .. }
            | ProviderError::Timeout { .. } => true,
            ProviderError::Http { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::Authentication { .. } => "AUTH_FAILED",
            ProviderError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ProviderError::RateLimited { .. } => "RATE_LIMITED",
            ProviderError::Http { .. } => "HTTP_ERROR",
            ProviderError::Network { .. } => "NETWORK_ERROR",
            ProviderError::Timeout { .. } => "TIMEOUT",
            ProviderError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            ProviderError::Configuration { .. } => "INVALID_CONFIG",
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        ProviderError::Network {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ProviderError::Configuration {
            message: message.into(),
        }
    }
}

/// Parses a `Retry-After` header given in delta-seconds.
///
/// HTTP-date values are ignored; neither provider sends them.
pub fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

/// Error code derived from an HTTP status when the body carries none,
/// e.g. `"ServiceUnavailable"`.
pub fn status_code_name(canonical_reason: Option<&str>) -> String {
    canonical_reason.unwrap_or("Unknown").replace(' ', "")
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, ProviderError>;
