//! Entra ID provider configuration.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::{EntraError, EntraResult};

/// National cloud the tenant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntraCloudEnvironment {
    #[default]
    Commercial,
    UsGovernment,
    China,
}

impl EntraCloudEnvironment {
    /// Microsoft Graph root for this cloud.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }

    /// Azure AD login authority for this cloud.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }
}

impl FromStr for EntraCloudEnvironment {
    type Err = EntraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "commercial" | "public" | "global" => Ok(Self::Commercial),
            "us_government" | "usgov" | "gcc_high" => Ok(Self::UsGovernment),
            "china" => Ok(Self::China),
            other => Err(EntraError::Config(format!(
                "unknown cloud environment '{other}'"
            ))),
        }
    }
}

/// App registration credentials for the client-credentials flow.
#[derive(Debug)]
pub struct EntraCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Entra ID provider configuration.
#[derive(Debug, Clone)]
pub struct EntraConfig {
    pub tenant_id: String,
    pub cloud_environment: EntraCloudEnvironment,
    /// Graph API version segment, `v1.0` unless overridden.
    pub api_version: String,
    /// Per-request timeout. Keep it well below the pass deadline.
    pub request_timeout: Duration,
    graph_endpoint: Option<String>,
    login_endpoint: Option<String>,
}

impl EntraConfig {
    #[must_use]
    pub fn builder() -> EntraConfigBuilder {
        EntraConfigBuilder::default()
    }

    /// Graph root, honoring an endpoint override.
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        self.graph_endpoint
            .as_deref()
            .unwrap_or_else(|| self.cloud_environment.graph_endpoint())
    }

    /// Login authority, honoring an endpoint override.
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        self.login_endpoint
            .as_deref()
            .unwrap_or_else(|| self.cloud_environment.login_endpoint())
    }

    /// Versioned Graph base URL, e.g. `https://graph.microsoft.com/v1.0`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.graph_endpoint().trim_end_matches('/'),
            self.api_version
        )
    }

    /// `.default` scope for the client-credentials grant. Always issued
    /// against the cloud's real Graph resource, even with an override.
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{}/.default", self.cloud_environment.graph_endpoint())
    }
}

/// Builder for [`EntraConfig`].
#[derive(Debug, Default)]
pub struct EntraConfigBuilder {
    tenant_id: Option<String>,
    cloud_environment: EntraCloudEnvironment,
    api_version: Option<String>,
    request_timeout: Option<Duration>,
    graph_endpoint: Option<String>,
    login_endpoint: Option<String>,
}

impl EntraConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn cloud_environment(mut self, cloud: EntraCloudEnvironment) -> Self {
        self.cloud_environment = cloud;
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Point Graph calls at another host (mock servers, proxies).
    #[must_use]
    pub fn graph_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graph_endpoint = Some(endpoint.into());
        self
    }

    /// Point token requests at another host.
    #[must_use]
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint = Some(endpoint.into());
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is missing or an endpoint override
    /// is not a valid URL.
    pub fn build(self) -> EntraResult<EntraConfig> {
        let tenant_id = self
            .tenant_id
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| EntraError::Config("tenant_id is required".into()))?;

        for endpoint in [&self.graph_endpoint, &self.login_endpoint]
            .into_iter()
            .flatten()
        {
            url::Url::parse(endpoint)?;
        }

        let request_timeout = self.request_timeout.unwrap_or(Duration::from_secs(10));
        if request_timeout.is_zero() {
            return Err(EntraError::Config(
                "request_timeout must be greater than zero".into(),
            ));
        }

        Ok(EntraConfig {
            tenant_id,
            cloud_environment: self.cloud_environment,
            api_version: self.api_version.unwrap_or_else(|| "v1.0".to_string()),
            request_timeout,
            graph_endpoint: self.graph_endpoint,
            login_endpoint: self.login_endpoint,
        })
    }
}
