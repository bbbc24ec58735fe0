//! sunset Core Library
//!
//! Data model shared by the directory providers and the revocation engine.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`GrantId`, `PrincipalKey`, `GroupId`, ...)
//! - [`grant`] - Active elevated-access grants
//! - [`change`] - Change/incident records that justify a grant
//!
//! # Example
//!
//! ```
//! use sunset_core::{ChangeRecord, ChangeStatus, Grant};
//!
//! let grant = Grant::new("alice@example.com", "g-finance", "entra", "CHG-1001");
//! let record = ChangeRecord::new("CHG-1001", ChangeStatus::Closed);
//!
//! assert_eq!(grant.change_ref, record.change_ref);
//! assert!(record.status.is_terminal());
//! ```

pub mod change;
pub mod grant;
pub mod ids;

pub use change::{ChangeRecord, ChangeStatus};
pub use grant::Grant;
pub use ids::{ChangeRef, GrantId, GroupId, ParseIdError, PrincipalId, PrincipalKey, ProviderTag};
