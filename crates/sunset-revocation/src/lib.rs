//! # Revocation Engine
//!
//! Finds time-bound grants whose justification has lapsed and removes the
//! corresponding group memberships, within a hard deadline.
//!
//! - [`ChangeSource`] - active grants and the change records behind them
//! - [`RevocationPolicy`] - pure eligibility decision ([`ChangeStatusPolicy`])
//! - [`MembershipVerifier`] - existence and membership checks
//! - [`RevocationExecutor`] - resolve, check, remove for one grant
//! - [`RevocationCoordinator`] - the bounded, deadline-aware pass
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sunset_core::{ChangeRecord, ChangeStatus, Grant, ProviderTag};
//! use sunset_directory::{DirectoryRegistry, InMemoryDirectory};
//! use sunset_revocation::{
//!     ChangeStatusPolicy, CoordinatorConfig, InMemoryChangeSource, OutcomeKind,
//!     RevocationCoordinator,
//! };
//!
//! # async fn example() -> Result<(), sunset_revocation::RevocationError> {
//! let directory = Arc::new(InMemoryDirectory::named("entra"));
//! directory.add_member("g-finance", "alice@example.com");
//!
//! let source = Arc::new(InMemoryChangeSource::new());
//! source.add_grant(Grant::new("alice@example.com", "g-finance", ProviderTag::ENTRA, "CHG-1"));
//! source.put_record(ChangeRecord::new("CHG-1", ChangeStatus::Closed));
//!
//! let coordinator = RevocationCoordinator::new(
//!     source,
//!     Arc::new(DirectoryRegistry::new().with(ProviderTag::ENTRA, directory)),
//!     Arc::new(ChangeStatusPolicy::new()),
//!     CoordinatorConfig::default(),
//! )?;
//!
//! let outcomes = coordinator.run_revocation_pass(Duration::from_secs(25)).await?;
//! assert_eq!(outcomes[0].kind, OutcomeKind::Revoked);
//! # Ok(())
//! # }
//! ```

pub mod change_source;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod http_source;
pub mod outcome;
pub mod policy;
pub mod verifier;

pub use change_source::{ChangeSource, InMemoryChangeSource};
pub use coordinator::{CoordinatorConfig, Deadline, RevocationCoordinator};
pub use error::{ChangeSourceError, ChangeSourceResult, RevocationError};
pub use executor::RevocationExecutor;
pub use http_source::HttpChangeSource;
pub use outcome::{FailureReason, OutcomeKind, PassSummary, RevocationOutcome};
pub use policy::{ChangeStatusPolicy, RevocationPolicy};
pub use verifier::MembershipVerifier;
