//! `DirectoryClient` implementation backed by Microsoft Graph.

use std::sync::Arc;

use serde::Deserialize;
use sunset_core::{GroupId, PrincipalId, PrincipalKey};
use sunset_directory::{async_trait, DirectoryClient, DirectoryResult, Lookup, Removal};
use tracing::{debug, instrument};

use crate::{EntraConfig, EntraCredentials, EntraError, EntraResult, GraphClient, TokenCache};

#[derive(Debug, Deserialize)]
struct DirectoryObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryObjectPage {
    value: Vec<DirectoryObject>,
}

/// Graph answers 400 instead of 404 when removing a member reference that
/// is not a direct member.
fn is_missing_member_reference(error: &EntraError) -> bool {
    matches!(
        error,
        EntraError::GraphApi { status: 400, code, message }
            if code == "Request_BadRequest"
                && message.contains("removed object references do not exist")
    )
}

/// Microsoft Entra ID directory.
///
/// Membership is checked against the group's direct members with a
/// `$filter` on the principal's object id, so one request answers for one
/// (user, group) pair regardless of either side's size.
#[derive(Debug)]
pub struct EntraDirectory {
    config: EntraConfig,
    graph_client: GraphClient,
}

impl EntraDirectory {
    /// Creates a new Entra directory client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: EntraConfig, credentials: EntraCredentials) -> EntraResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EntraError::Config(format!("Failed to create HTTP client: {e}")))?;

        let token_cache = Arc::new(TokenCache::new(credentials, &config, http_client.clone()));
        let graph_client = GraphClient::new(http_client, token_cache, config.base_url());

        Ok(Self {
            config,
            graph_client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EntraConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.graph_client.base_url(), path)
    }
}

#[async_trait]
impl DirectoryClient for EntraDirectory {
    fn provider_name(&self) -> &str {
        "entra"
    }

    #[instrument(skip(self), fields(tenant_id = %self.config.tenant_id))]
    async fn resolve_principal(
        &self,
        principal: &PrincipalKey,
    ) -> DirectoryResult<Lookup<PrincipalId>> {
        let url = self.url(&format!(
            "/users/{}?$select=id",
            urlencoding::encode(principal.as_str())
        ));

        let user: Option<DirectoryObject> = self.graph_client.get(&url).await?;
        debug!(found = user.is_some(), "Resolved principal");
        Ok(user.map(|u| PrincipalId::new(u.id)).into())
    }

    #[instrument(skip(self), fields(tenant_id = %self.config.tenant_id))]
    async fn is_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Lookup<bool>> {
        let filter = format!("id eq '{}'", principal.as_str().replace('\'', "''"));
        let url = self.url(&format!(
            "/groups/{}/members?$filter={}&$select=id&$count=true",
            urlencoding::encode(group.as_str()),
            urlencoding::encode(&filter)
        ));

        let page: Option<DirectoryObjectPage> = self.graph_client.get_advanced(&url).await?;
        Ok(page
            .map(|p| {
                p.value
                    .iter()
                    .any(|member| member.id.eq_ignore_ascii_case(principal.as_str()))
            })
            .into())
    }

    #[instrument(skip(self), fields(tenant_id = %self.config.tenant_id))]
    async fn remove_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Removal> {
        let url = self.url(&format!(
            "/groups/{}/members/{}/$ref",
            urlencoding::encode(group.as_str()),
            urlencoding::encode(principal.as_str())
        ));

        match self.graph_client.delete(&url).await {
            Ok(true) => Ok(Removal::Removed),
            Ok(false) => Ok(Removal::NotFound),
            Err(e) if is_missing_member_reference(&e) => {
                debug!("Member reference already absent");
                Ok(Removal::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }
}
