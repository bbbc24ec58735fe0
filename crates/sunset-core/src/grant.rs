//! Active elevated-access grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChangeRef, GrantId, GroupId, PrincipalKey, ProviderTag};

/// One active elevated-access entry tying a principal to a group.
///
/// Grants are issued elsewhere and are read-only here: a revocation pass
/// produces an outcome for a grant, it never changes the grant itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Unique grant identifier.
    pub id: GrantId,
    /// The principal holding the elevated access.
    pub principal: PrincipalKey,
    /// The group or resource the principal was added to.
    pub group: GroupId,
    /// Which identity provider owns `group`.
    pub provider: ProviderTag,
    /// The change or incident that justifies the access.
    pub change_ref: ChangeRef,
    /// When the grant was issued.
    pub created_at: DateTime<Utc>,
}

impl Grant {
    /// Creates a grant issued now with a fresh identifier.
    pub fn new(
        principal: impl Into<PrincipalKey>,
        group: impl Into<GroupId>,
        provider: impl Into<ProviderTag>,
        change_ref: impl Into<ChangeRef>,
    ) -> Self {
        Self {
            id: GrantId::new(),
            principal: principal.into(),
            group: group.into(),
            provider: provider.into(),
            change_ref: change_ref.into(),
            created_at: Utc::now(),
        }
    }

    /// Overrides the grant identifier.
    #[must_use]
    pub fn with_id(mut self, id: GrantId) -> Self {
        self.id = id;
        self
    }

    /// Overrides the issue timestamp.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
