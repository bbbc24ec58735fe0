//! `DirectoryClient` implementation backed by the Admin SDK Directory API.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use sunset_core::{GroupId, PrincipalId, PrincipalKey};
use sunset_directory::{
    async_trait, parse_retry_after, status_code_name, DirectoryClient, DirectoryResult, Lookup,
    Removal,
};
use tracing::{debug, instrument};

use crate::{GoogleConfig, GoogleError, GoogleResult, TokenCache};

#[derive(Debug, Deserialize)]
struct UserResource {
    id: String,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: String,
}

/// Google Workspace directory.
#[derive(Debug)]
pub struct GoogleDirectory {
    http_client: reqwest::Client,
    token_cache: TokenCache,
    directory_url: String,
}

impl GoogleDirectory {
    /// Creates a new Google directory client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the service
    /// account key is unusable.
    pub fn new(config: GoogleConfig) -> GoogleResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GoogleError::Config(format!("Failed to create HTTP client: {e}")))?;

        let token_cache = TokenCache::new(&config, http_client.clone())?;

        Ok(Self {
            http_client,
            token_cache,
            directory_url: config.directory_url(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.directory_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> GoogleResult<Option<T>> {
        match self.send(reqwest::Method::GET, url).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// Sends one request. `Ok(None)` means the resource does not exist.
    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> GoogleResult<Option<reqwest::Response>> {
        let token = self.token_cache.get_token().await?;
        let response = self
            .http_client
            .request(method, url)
            .bearer_auth(&token)
            .send()
            .await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Directory API response");

        if status.is_success() {
            return Ok(Some(response));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.token_cache.invalidate().await;
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            return Err(GoogleError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
            let reason = api_error
                .error
                .errors
                .into_iter()
                .next()
                .map(|d| d.reason)
                .or(api_error.error.status)
                .unwrap_or_else(|| status.as_u16().to_string());
            return Err(GoogleError::Api {
                status: status.as_u16(),
                reason,
                message: api_error.error.message,
            });
        }

        Err(GoogleError::Api {
            status: status.as_u16(),
            reason: status_code_name(status.canonical_reason()),
            message: body,
        })
    }
}

#[async_trait]
impl DirectoryClient for GoogleDirectory {
    fn provider_name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self))]
    async fn resolve_principal(
        &self,
        principal: &PrincipalKey,
    ) -> DirectoryResult<Lookup<PrincipalId>> {
        let url = self.url(&format!(
            "/users/{}?fields=id",
            urlencoding::encode(principal.as_str())
        ));

        let user: Option<UserResource> = self.get(&url).await?;
        Ok(user.map(|u| PrincipalId::new(u.id)).into())
    }

    #[instrument(skip(self))]
    async fn is_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Lookup<bool>> {
        // members.get answers for direct members only.
        let url = self.url(&format!(
            "/groups/{}/members/{}?fields=id",
            urlencoding::encode(group.as_str()),
            urlencoding::encode(principal.as_str())
        ));

        let member: Option<IgnoredAny> = self.get(&url).await?;
        debug!(direct_member = member.is_some(), "Checked membership");
        Ok(Lookup::Found(member.is_some()))
    }

    #[instrument(skip(self))]
    async fn remove_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Removal> {
        let url = self.url(&format!(
            "/groups/{}/members/{}",
            urlencoding::encode(group.as_str()),
            urlencoding::encode(principal.as_str())
        ));

        match self.send(reqwest::Method::DELETE, &url).await? {
            Some(_) => Ok(Removal::Removed),
            None => Ok(Removal::NotFound),
        }
    }
}
