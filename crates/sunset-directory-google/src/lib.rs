//! Google Workspace provider for sunset
//!
//! Implements [`sunset_directory::DirectoryClient`] against the Admin SDK
//! Directory API using a service account with domain-wide delegation.
//!
//! - Principals are resolved with `users.get` (primary email, alias or id)
//! - Direct membership is checked with `members.get`
//! - Removal uses `members.delete`
//!
//! HTTP 404 maps to [`sunset_directory::Lookup::NotFound`] or
//! [`sunset_directory::Removal::NotFound`]. Requests are never retried.

mod auth;
mod config;
mod directory;
mod error;

pub use auth::TokenCache;
pub use config::{
    GoogleConfig, GoogleConfigBuilder, ServiceAccountKey, DEFAULT_BASE_URL, DEFAULT_SCOPES,
    DEFAULT_TOKEN_URI,
};
pub use directory::GoogleDirectory;
pub use error::{GoogleError, GoogleResult};
