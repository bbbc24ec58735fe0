//! Google directory provider configuration.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::{GoogleError, GoogleResult};

/// Admin SDK root.
pub const DEFAULT_BASE_URL: &str = "https://admin.googleapis.com";

/// OAuth2 token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Scopes needed to look up users and manage group members.
pub const DEFAULT_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/admin.directory.group.member",
    "https://www.googleapis.com/auth/admin.directory.user.readonly",
];

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The parts of a service-account JSON key that the JWT flow needs.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parses a key from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or lacks required fields.
    pub fn from_json(json: &str) -> GoogleResult<Self> {
        serde_json::from_str(json).map_err(|e| GoogleError::ServiceAccountKey(e.to_string()))
    }

    /// Reads a key file downloaded from the Cloud console.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> GoogleResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GoogleError::ServiceAccountKey(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// Google directory provider configuration.
#[derive(Debug)]
pub struct GoogleConfig {
    pub service_account: ServiceAccountKey,
    /// Workspace admin impersonated through domain-wide delegation.
    pub subject: Option<String>,
    pub base_url: String,
    pub scopes: Vec<String>,
    pub request_timeout: Duration,
}

impl GoogleConfig {
    #[must_use]
    pub fn builder(service_account: ServiceAccountKey) -> GoogleConfigBuilder {
        GoogleConfigBuilder {
            service_account,
            subject: None,
            base_url: None,
            token_uri: None,
            scopes: None,
            request_timeout: None,
        }
    }

    /// Directory API root, e.g. `https://admin.googleapis.com/admin/directory/v1`.
    #[must_use]
    pub fn directory_url(&self) -> String {
        format!(
            "{}/admin/directory/v1",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Builder for [`GoogleConfig`].
#[derive(Debug)]
pub struct GoogleConfigBuilder {
    service_account: ServiceAccountKey,
    subject: Option<String>,
    base_url: Option<String>,
    token_uri: Option<String>,
    scopes: Option<Vec<String>>,
    request_timeout: Option<Duration>,
}

impl GoogleConfigBuilder {
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Point directory calls at another host (mock servers, proxies).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the token endpoint from the key file.
    #[must_use]
    pub fn token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = Some(token_uri.into());
        self
    }

    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for empty scopes, a zero timeout or invalid URLs.
    pub fn build(self) -> GoogleResult<GoogleConfig> {
        let mut service_account = self.service_account;
        if let Some(token_uri) = self.token_uri {
            service_account.token_uri = token_uri;
        }
        if service_account.client_email.trim().is_empty() {
            return Err(GoogleError::ServiceAccountKey(
                "client_email is empty".into(),
            ));
        }
        url::Url::parse(&service_account.token_uri)?;

        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)?;

        let scopes = self
            .scopes
            .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(ToString::to_string).collect());
        if scopes.is_empty() {
            return Err(GoogleError::Config("at least one scope is required".into()));
        }

        let request_timeout = self.request_timeout.unwrap_or(Duration::from_secs(10));
        if request_timeout.is_zero() {
            return Err(GoogleError::Config(
                "request_timeout must be greater than zero".into(),
            ));
        }

        Ok(GoogleConfig {
            service_account,
            subject: self.subject.filter(|s| !s.trim().is_empty()),
            base_url,
            scopes,
            request_timeout,
        })
    }
}
