//! Directory capability trait
//!
//! The contract every identity provider implements. Each method maps to a
//! single outbound request, and provider-specific "not found" answers
//! (usually HTTP 404) come back as values, not errors.

use async_trait::async_trait;
use sunset_core::{GroupId, PrincipalId, PrincipalKey};

use crate::error::DirectoryResult;

/// Result of a lookup that may legitimately find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The provider answered with a value.
    Found(T),
    /// The provider does not know the object.
    NotFound,
}

impl<T> Lookup<T> {
    /// Converts into an `Option`, discarding the distinction from errors
    /// that is already encoded by the surrounding `Result`.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Lookup::NotFound, Lookup::Found)
    }
}

/// Result of a membership removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The membership existed and was removed by this call.
    Removed,
    /// There was nothing to remove: the group, the principal or the
    /// membership itself is already gone.
    NotFound,
}

/// Capability contract for a group/directory provider.
///
/// One instance serves every grant carrying its provider tag. Implementations
/// must not retry internally: a revocation pass runs against a hard deadline,
/// and retry policy belongs to whoever schedules passes.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Short name used in logs (e.g. `"entra"`).
    fn provider_name(&self) -> &str;

    /// Resolve a caller-facing principal reference to the provider's id.
    async fn resolve_principal(&self, principal: &PrincipalKey)
        -> DirectoryResult<Lookup<PrincipalId>>;

    /// Check direct membership of `principal` in `group` with one targeted
    /// request.
    ///
    /// Implementations must never enumerate the principal's groups or the
    /// group's members; the cost of this call has to be independent of
    /// either list's size.
    async fn is_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Lookup<bool>>;

    /// Remove `principal` from `group`.
    async fn remove_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Removal>;
}
