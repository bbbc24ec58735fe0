use std::env::VarError;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use sunset_core::ProviderTag;
use sunset_directory_entra::EntraCloudEnvironment;

/// Worker configuration, read from the environment.
#[derive(Debug)]
pub struct WorkerConfig {
    /// Base URL of the change-tracking API.
    pub changes_url: String,

    /// Bearer token for the change-tracking API.
    pub changes_token: Option<SecretString>,

    /// Grants processed at once.
    pub concurrency: usize,

    /// Change records fetched at once.
    pub change_fetch_concurrency: usize,

    /// Wall-clock budget for one pass.
    pub deadline: Duration,

    /// Time between passes. `None` runs a single pass and exits.
    pub interval: Option<Duration>,

    /// Access kept after a change closes.
    pub closure_grace: chrono::Duration,

    /// Revoke grants older than this regardless of change state.
    pub max_grant_age: Option<chrono::Duration>,

    /// Timeout for each outbound HTTP request.
    pub http_timeout: Duration,

    /// Log filter used when `RUST_LOG` does not parse.
    pub log_filter: String,

    pub entra: Option<EntraSettings>,
    pub google: Option<GoogleSettings>,
}

/// Entra ID provider settings.
#[derive(Debug)]
pub struct EntraSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub cloud: EntraCloudEnvironment,
    pub provider_tag: ProviderTag,
}

/// Google Workspace provider settings.
#[derive(Debug)]
pub struct GoogleSettings {
    pub service_account_file: PathBuf,
    pub admin_subject: Option<String>,
    pub provider_tag: ProviderTag,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader, so tests never
    /// touch process-global environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let changes_url = reader("SUNSET_CHANGES_URL")
            .map_err(|_| ConfigError::MissingVar("SUNSET_CHANGES_URL".into()))?;

        let changes_token = reader("SUNSET_CHANGES_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        let concurrency: usize = parse_positive(&reader, "SUNSET_CONCURRENCY", 8)?;
        let change_fetch_concurrency: usize =
            parse_positive(&reader, "SUNSET_CHANGE_FETCH_CONCURRENCY", 16)?;

        let deadline = Duration::from_secs(parse_positive(&reader, "SUNSET_DEADLINE_SECS", 25)?);
        let interval = parse_optional::<u64, _>(&reader, "SUNSET_INTERVAL_SECS")?
            .map(|secs| {
                if secs == 0 {
                    Err(ConfigError::InvalidValue(
                        "SUNSET_INTERVAL_SECS".into(),
                        "must be greater than zero".into(),
                    ))
                } else {
                    Ok(Duration::from_secs(secs))
                }
            })
            .transpose()?;
        let http_timeout =
            Duration::from_secs(parse_positive(&reader, "SUNSET_HTTP_TIMEOUT_SECS", 10)?);

        let closure_grace = seconds(
            "SUNSET_CLOSURE_GRACE_SECS",
            parse_or(&reader, "SUNSET_CLOSURE_GRACE_SECS", 0)?,
        )?;
        let max_grant_age = parse_optional(&reader, "SUNSET_MAX_GRANT_AGE_SECS")?
            .map(|secs| seconds("SUNSET_MAX_GRANT_AGE_SECS", secs))
            .transpose()?;

        let log_filter = reader("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let entra = Self::entra_settings(&reader)?;
        let google = Self::google_settings(&reader)?;

        match (&entra, &google) {
            (None, None) => {
                return Err(ConfigError::MissingVar(
                    "ENTRA_TENANT_ID or GOOGLE_SERVICE_ACCOUNT_FILE".into(),
                ))
            }
            (Some(e), Some(g)) if e.provider_tag == g.provider_tag => {
                return Err(ConfigError::InvalidValue(
                    "GOOGLE_PROVIDER_TAG".into(),
                    format!("'{}' is already used by Entra", g.provider_tag),
                ))
            }
            _ => {}
        }

        Ok(Self {
            changes_url,
            changes_token,
            concurrency,
            change_fetch_concurrency,
            deadline,
            interval,
            closure_grace,
            max_grant_age,
            http_timeout,
            log_filter,
            entra,
            google,
        })
    }

    fn entra_settings<F>(reader: &F) -> Result<Option<EntraSettings>, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let Ok(tenant_id) = reader("ENTRA_TENANT_ID") else {
            return Ok(None);
        };

        let client_id = reader("ENTRA_CLIENT_ID")
            .map_err(|_| ConfigError::MissingVar("ENTRA_CLIENT_ID".into()))?;
        let client_secret = reader("ENTRA_CLIENT_SECRET")
            .map_err(|_| ConfigError::MissingVar("ENTRA_CLIENT_SECRET".into()))?;
        let cloud = parse_or(reader, "ENTRA_CLOUD", EntraCloudEnvironment::Commercial)?;
        let provider_tag = reader("ENTRA_PROVIDER_TAG")
            .unwrap_or_else(|_| ProviderTag::ENTRA.to_string());

        Ok(Some(EntraSettings {
            tenant_id,
            client_id,
            client_secret: SecretString::from(client_secret),
            cloud,
            provider_tag: ProviderTag::new(provider_tag),
        }))
    }

    fn google_settings<F>(reader: &F) -> Result<Option<GoogleSettings>, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let Ok(service_account_file) = reader("GOOGLE_SERVICE_ACCOUNT_FILE") else {
            return Ok(None);
        };
        let provider_tag = reader("GOOGLE_PROVIDER_TAG")
            .unwrap_or_else(|_| ProviderTag::GOOGLE.to_string());

        Ok(Some(GoogleSettings {
            service_account_file: PathBuf::from(service_account_file),
            admin_subject: reader("GOOGLE_ADMIN_SUBJECT").ok(),
            provider_tag: ProviderTag::new(provider_tag),
        }))
    }
}

fn parse_optional<T, F>(reader: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    match reader(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        Err(_) => Ok(None),
    }
}

fn parse_or<T, F>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    Ok(parse_optional(reader, key)?.unwrap_or(default))
}

fn parse_positive<T, F>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + From<u8>,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    let value = parse_or(reader, key, default)?;
    if value == T::from(0) {
        return Err(ConfigError::InvalidValue(
            key.into(),
            "must be greater than zero".into(),
        ));
    }
    Ok(value)
}

/// Upper bound for policy durations (100 years).
const MAX_POLICY_DURATION_SECS: i64 = 100 * 365 * 24 * 60 * 60;

fn seconds(key: &str, secs: i64) -> Result<chrono::Duration, ConfigError> {
    Some(secs)
        .filter(|s| (0..=MAX_POLICY_DURATION_SECS).contains(s))
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                key.into(),
                format!("must be between 0 and {MAX_POLICY_DURATION_SECS} seconds"),
            )
        })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
