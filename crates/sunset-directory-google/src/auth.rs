//! Service-account tokens for the Admin SDK.
//!
//! Uses the OAuth2 JWT-bearer grant: an RS256 assertion signed with the
//! service account key is exchanged for a short-lived access token.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{GoogleConfig, GoogleError, GoogleResult};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion. Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Token cache for a service account.
pub struct TokenCache {
    client_email: String,
    subject: Option<String>,
    token_uri: String,
    scope: String,
    signing_key: EncodingKey,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("client_email", &self.client_email)
            .field("subject", &self.subject)
            .field("token_uri", &self.token_uri)
            .field("signing_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenCache {
    /// Creates a token cache, parsing the service account key up front so a
    /// bad key fails at startup rather than on the first grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the private key is not a valid RSA PEM.
    pub fn new(config: &GoogleConfig, http_client: reqwest::Client) -> GoogleResult<Self> {
        let key = &config.service_account;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| GoogleError::ServiceAccountKey(format!("invalid private key: {e}")))?;

        Ok(Self {
            client_email: key.client_email.clone(),
            subject: config.subject.clone(),
            token_uri: key.token_uri.clone(),
            scope: config.scopes.join(" "),
            signing_key,
            http_client,
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(5),
        })
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self), fields(client_email = %self.client_email))]
    pub async fn get_token(&self) -> GoogleResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cache = self.cached_token.write().await;
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

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }

    fn sign_assertion(&self, issued_at: i64) -> GoogleResult<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: self.scope.clone(),
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
            sub: self.subject.as_deref(),
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key).map_err(GoogleError::from)
    }

    async fn acquire_token(&self) -> GoogleResult<CachedToken> {
        let assertion = self.sign_assertion(Utc::now().timestamp())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::Auth(format!("Failed to parse token response: {e}")))?;

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at: Utc::now() + Duration::seconds(token_response.expires_in),
        })
    }
}
