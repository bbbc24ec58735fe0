//! Microsoft Entra ID provider for sunset
//!
//! Implements [`sunset_directory::DirectoryClient`] against the Microsoft
//! Graph API.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication with a shared token cache
//! - Principal lookup by user principal name or object id
//! - Direct membership checks via a `$filter` on the group's members
//! - Membership removal via `DELETE /groups/{id}/members/{id}/$ref`
//! - National cloud support (Commercial, US Government, China)
//!
//! HTTP 404 is reported as [`sunset_directory::Lookup::NotFound`] or
//! [`sunset_directory::Removal::NotFound`]; nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use sunset_directory::DirectoryClient;
//! use sunset_core::PrincipalKey;
//! use sunset_directory_entra::{EntraConfig, EntraCredentials, EntraDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EntraConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .build()?;
//!
//! let credentials = EntraCredentials {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//! };
//!
//! let directory = EntraDirectory::new(config, credentials)?;
//! let id = directory.resolve_principal(&PrincipalKey::new("alice@contoso.com")).await?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod directory;
mod error;
mod graph_client;

// Re-exports
pub use auth::TokenCache;
pub use config::{EntraCloudEnvironment, EntraConfig, EntraConfigBuilder, EntraCredentials};
pub use directory::EntraDirectory;
pub use error::{EntraError, EntraResult};
pub use graph_client::GraphClient;
