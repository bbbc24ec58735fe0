//! Builds the directory registry from worker configuration.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use sunset_directory::DirectoryRegistry;
use sunset_directory_entra::{EntraConfig, EntraCredentials, EntraDirectory, EntraError};
use sunset_directory_google::{GoogleConfig, GoogleDirectory, GoogleError, ServiceAccountKey};
use tracing::info;

use crate::config::{EntraSettings, GoogleSettings, WorkerConfig};

/// Failure to construct a provider client at startup.
#[derive(Debug, thiserror::Error)]
pub enum ProviderSetupError {
    #[error("Entra provider: {0}")]
    Entra(#[from] EntraError),

    #[error("Google provider: {0}")]
    Google(#[from] GoogleError),
}

pub fn build_registry(config: &WorkerConfig) -> Result<DirectoryRegistry, ProviderSetupError> {
    let mut registry = DirectoryRegistry::new();

    if let Some(settings) = &config.entra {
        let directory = entra_directory(settings, config)?;
        info!(provider = %settings.provider_tag, tenant_id = %settings.tenant_id, "Entra provider enabled");
        registry.register(settings.provider_tag.clone(), Arc::new(directory));
    }

    if let Some(settings) = &config.google {
        let directory = google_directory(settings, config)?;
        info!(provider = %settings.provider_tag, "Google provider enabled");
        registry.register(settings.provider_tag.clone(), Arc::new(directory));
    }

    Ok(registry)
}

fn entra_directory(
    settings: &EntraSettings,
    config: &WorkerConfig,
) -> Result<EntraDirectory, EntraError> {
    let entra_config = EntraConfig::builder()
        .tenant_id(&settings.tenant_id)
        .cloud_environment(settings.cloud)
        .request_timeout(config.http_timeout)
        .build()?;
    let credentials = EntraCredentials {
        client_id: settings.client_id.clone(),
        client_secret: SecretString::from(settings.client_secret.expose_secret().to_owned()),
    };
    EntraDirectory::new(entra_config, credentials)
}

fn google_directory(
    settings: &GoogleSettings,
    config: &WorkerConfig,
) -> Result<GoogleDirectory, GoogleError> {
    let key = ServiceAccountKey::from_file(&settings.service_account_file)?;
    let mut builder = GoogleConfig::builder(key).request_timeout(config.http_timeout);
    if let Some(subject) = &settings.admin_subject {
        builder = builder.subject(subject);
    }
    GoogleDirectory::new(builder.build()?)
}
