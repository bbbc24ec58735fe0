//! Strongly Typed Identifiers
//!
//! Newtypes for the identifiers that flow through a revocation pass. Grants
//! carry a UUID of their own; everything that names something inside an
//! external system (principals, groups, change tickets, providers) is an
//! opaque string owned by that system.
//!
//! # Example
//!
//! ```
//! use sunset_core::{GrantId, GroupId, PrincipalKey};
//!
//! let grant = GrantId::new();
//! let principal = PrincipalKey::new("alice@example.com");
//! let group = GroupId::new("g-finance");
//!
//! // Type safety: a group id cannot be passed where a principal is expected
//! fn requires_principal(p: &PrincipalKey) -> &str {
//!     p.as_str()
//! }
//!
//! assert_eq!(requires_principal(&principal), "alice@example.com");
//! // requires_principal(&group); // This would not compile!
//! # let _ = (grant, group);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a UUID-backed identifier type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

/// Macro to define an identifier owned by an external system.
macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an external identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of one active elevated-access grant.
    ///
    /// ```
    /// use sunset_core::GrantId;
    ///
    /// let id: GrantId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    /// ```
    GrantId
);

define_key!(
    /// Caller-facing reference to a principal, usually a UPN or email
    /// address. Providers resolve it to a [`PrincipalId`].
    PrincipalKey
);

define_key!(
    /// Provider-internal object id of a principal.
    PrincipalId
);

define_key!(
    /// Group or resource identifier in the owning provider.
    GroupId
);

define_key!(
    /// Reference to the change or incident record justifying a grant.
    ChangeRef
);

define_key!(
    /// Names the identity provider that owns a grant's group.
    ///
    /// Each tag is bound to exactly one directory client at runtime.
    ProviderTag
);

impl ProviderTag {
    /// Default tag for the Microsoft Entra ID provider.
    pub const ENTRA: &'static str = "entra";

    /// Default tag for the Google Workspace directory provider.
    pub const GOOGLE: &'static str = "google";
}
