//! Change source backed by an HTTP/JSON change-tracking API.
//!
//! - `GET {base}/grants` returns a JSON array of grants
//! - `GET {base}/changes/{ref}` returns one change record, 404 if unknown

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sunset_core::{ChangeRecord, ChangeRef, Grant};
use tracing::{debug, instrument};

use crate::change_source::ChangeSource;
use crate::error::{ChangeSourceError, ChangeSourceResult};

/// HTTP change source.
#[derive(Debug)]
pub struct HttpChangeSource {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpChangeSource {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        request_timeout: Duration,
    ) -> ChangeSourceResult<Self> {
        url::Url::parse(base_url)
            .map_err(|e| ChangeSourceError::Configuration(format!("invalid base URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ChangeSourceError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ChangeSourceResult<Option<T>> {
        let mut request = self.http_client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Change source response");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChangeSourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ChangeSourceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ChangeSource for HttpChangeSource {
    #[instrument(skip(self))]
    async fn active_grants(&self) -> ChangeSourceResult<Vec<Grant>> {
        let url = format!("{}/grants", self.base_url);
        self.get_json(&url).await?.ok_or_else(|| ChangeSourceError::Http {
            status: 404,
            message: format!("{url} not found"),
        })
    }

    #[instrument(skip(self), fields(change_ref = %change_ref))]
    async fn fetch_change_record(&self, change_ref: &ChangeRef) -> ChangeSourceResult<ChangeRecord> {
        let url = format!(
            "{}/changes/{}",
            self.base_url,
            urlencoding::encode(change_ref.as_str())
        );
        self.get_json(&url)
            .await?
            .ok_or_else(|| ChangeSourceError::NotFound(change_ref.to_string()))
    }
}
