//! # Directory Capability Contract
//!
//! Abstraction over the group/directory providers that hold elevated-access
//! memberships.
//!
//! - [`DirectoryClient`] - resolve principals, check one membership, remove one membership
//! - [`Lookup`] / [`Removal`] - "not found" as a value instead of an error
//! - [`ProviderError`] - genuine provider or network faults
//! - [`DirectoryRegistry`] - binds provider tags to client instances
//! - [`InMemoryDirectory`] - in-process provider for tests and dry runs
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use sunset_core::{GroupId, PrincipalKey, ProviderTag};
//! use sunset_directory::{DirectoryRegistry, InMemoryDirectory, Lookup};
//!
//! # async fn example() -> Result<(), sunset_directory::ProviderError> {
//! let directory = Arc::new(InMemoryDirectory::named("entra"));
//! directory.add_member("g-finance", "alice@example.com");
//!
//! let registry = DirectoryRegistry::new().with(ProviderTag::ENTRA, directory);
//! let client = registry.get(&ProviderTag::new(ProviderTag::ENTRA)).unwrap();
//!
//! if let Lookup::Found(id) = client.resolve_principal(&PrincipalKey::new("alice@example.com")).await? {
//!     let member = client.is_member(&GroupId::new("g-finance"), &id).await?;
//!     assert_eq!(member, Lookup::Found(true));
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod registry;
pub mod traits;

pub use error::{parse_retry_after, status_code_name, DirectoryResult, ProviderError};
pub use memory::{DirectoryOp, InMemoryDirectory};
pub use registry::{DirectoryRegistry, SharedDirectoryClient};
pub use traits::{DirectoryClient, Lookup, Removal};

// Re-export async_trait for provider implementors
pub use async_trait::async_trait;
