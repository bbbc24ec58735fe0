//! Microsoft Graph API HTTP client.
//!
//! Issues exactly one request per call. Throttling and transient statuses
//! surface as errors instead of being retried, because every call runs
//! under a revocation pass deadline.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use sunset_directory::{parse_retry_after, status_code_name};
use tracing::{debug, instrument};

use crate::{EntraError, EntraResult, TokenCache};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}

/// Microsoft Graph API client.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: String,
}

impl GraphClient {
    /// Creates a new Graph client rooted at `base_url` (including the API
    /// version segment).
    pub fn new(http_client: reqwest::Client, token_cache: Arc<TokenCache>, base_url: String) -> Self {
        Self {
            http_client,
            token_cache,
            base_url,
        }
    }

    /// Returns the base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET returning `None` on 404.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> EntraResult<Option<T>> {
        match self.send(reqwest::Method::GET, url, &[]).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// GET with `ConsistencyLevel: eventual`, required by Graph advanced
    /// queries such as `$filter` on a group's members.
    #[instrument(skip(self))]
    pub async fn get_advanced<T: DeserializeOwned>(&self, url: &str) -> EntraResult<Option<T>> {
        match self
            .send(reqwest::Method::GET, url, &[("ConsistencyLevel", "eventual")])
            .await?
        {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// DELETE returning `false` on 404.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> EntraResult<bool> {
        Ok(self
            .send(reqwest::Method::DELETE, url, &[])
            .await?
            .is_some())
    }

    /// Sends one request. `Ok(None)` means the resource does not exist.
    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        headers: &[(&'static str, &'static str)],
    ) -> EntraResult<Option<reqwest::Response>> {
        let token = self.token_cache.get_token().await?;

        let mut request = self.http_client.request(method, url).bearer_auth(&token);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Graph response");

        if status.is_success() {
            return Ok(Some(response));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Force a fresh token for whoever calls next.
            self.token_cache.invalidate().await;
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            return Err(EntraError::RateLimited { retry_after_secs });
        }

        let error_body = response.text().await.unwrap_or_default();
        if let Ok(odata_error) = serde_json::from_str::<ODataError>(&error_body) {
            return Err(EntraError::GraphApi {
                status: status.as_u16(),
                code: odata_error.error.code,
                message: odata_error.error.message,
            });
        }

        Err(EntraError::GraphApi {
            status: status.as_u16(),
            code: status_code_name(status.canonical_reason()),
            message: error_body,
        })
    }
}
