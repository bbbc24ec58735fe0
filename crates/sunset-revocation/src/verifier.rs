//! Membership checks against a directory, with "not found" folded into
//! plain answers.

use sunset_core::{GroupId, PrincipalId, PrincipalKey};
use sunset_directory::{DirectoryResult, Lookup, SharedDirectoryClient};

/// Answers existence and membership questions for one provider.
#[derive(Clone)]
pub struct MembershipVerifier {
    client: SharedDirectoryClient,
}

impl std::fmt::Debug for MembershipVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipVerifier")
            .field("provider", &self.client.provider_name())
            .finish()
    }
}

impl MembershipVerifier {
    pub fn new(client: SharedDirectoryClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SharedDirectoryClient {
        &self.client
    }

    /// Provider id of `principal`, or `None` if the provider does not know it.
    pub async fn resolve(&self, principal: &PrincipalKey) -> DirectoryResult<Option<PrincipalId>> {
        Ok(self.client.resolve_principal(principal).await?.found())
    }

    pub async fn exists(&self, principal: &PrincipalKey) -> DirectoryResult<bool> {
        Ok(self.resolve(principal).await?.is_some())
    }

    /// Direct membership of an already resolved principal. An unknown group
    /// or principal counts as "not a member".
    pub async fn has_membership(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<bool> {
        Ok(match self.client.is_member(group, principal).await? {
            Lookup::Found(member) => member,
            Lookup::NotFound => false,
        })
    }

    pub async fn is_member_of_group(
        &self,
        principal: &PrincipalKey,
        group: &GroupId,
    ) -> DirectoryResult<bool> {
        match self.resolve(principal).await? {
            Some(id) => self.has_membership(group, &id).await,
            None => Ok(false),
        }
    }
}
