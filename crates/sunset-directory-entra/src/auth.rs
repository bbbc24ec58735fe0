//! OAuth2 client-credentials tokens for Microsoft Graph.

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{EntraConfig, EntraCredentials, EntraError, EntraResult};

/// OAuth2 token response from Azure AD.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Token cache for the client-credentials flow.
///
/// Concurrent callers share one token; the write lock serializes refreshes
/// so a burst of grants triggers a single token request.
#[derive(Debug)]
pub struct TokenCache {
    credentials: EntraCredentials,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
    /// Grace period before expiry to trigger refresh (default: 5 minutes).
    grace_period: Duration,
}

impl TokenCache {
    /// Creates a new token cache for the configured tenant.
    pub fn new(
        credentials: EntraCredentials,
        config: &EntraConfig,
        http_client: reqwest::Client,
    ) -> Self {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            config.login_endpoint().trim_end_matches('/'),
            config.tenant_id
        );

        Self {
            credentials,
            token_url,
            scope: config.scope(),
            http_client,
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> EntraResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cache = self.cached_token.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(ref token) = *cache {
            if !token.is_expired(self.grace_period) {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Refreshing access token");
        let new_token = self.acquire_token().await?;
        let access_token = new_token.access_token.clone();
        *cache = Some(new_token);
        Ok(access_token)
    }

    /// Acquires a new access token using client credentials flow.
    async fn acquire_token(&self) -> EntraResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| EntraError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EntraError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| EntraError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);

        debug!(
            "Acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };

        // Not expired with 5 minute grace
        assert!(!token.is_expired(Duration::minutes(5)));

        // Expired with 15 minute grace
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn test_cached_token_already_expired() {
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        };

        assert!(token.is_expired(Duration::minutes(0)));
    }

    #[test]
    fn test_token_url_uses_tenant_and_override() {
        let config = EntraConfig::builder()
            .tenant_id("contoso")
            .login_endpoint("http://localhost:9999/")
            .build()
            .unwrap();
        let cache = TokenCache::new(
            EntraCredentials {
                client_id: "app".into(),
                client_secret: "secret".to_string().into(),
            },
            &config,
            reqwest::Client::new(),
        );

        assert_eq!(
            cache.token_url,
            "http://localhost:9999/contoso/oauth2/v2.0/token"
        );
    }
}
