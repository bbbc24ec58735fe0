//! Per-grant revocation sequence.

use std::sync::Arc;

use sunset_core::Grant;
use sunset_directory::{DirectoryRegistry, Removal};
use tracing::{debug, info, instrument, warn};

use crate::outcome::{FailureReason, OutcomeKind, RevocationOutcome};
use crate::verifier::MembershipVerifier;

/// Runs resolve → check → remove for one eligible grant.
///
/// Every call produces an outcome; provider faults are captured in
/// [`OutcomeKind::Failed`] instead of being returned as errors.
#[derive(Debug, Clone)]
pub struct RevocationExecutor {
    registry: Arc<DirectoryRegistry>,
}

impl RevocationExecutor {
    pub fn new(registry: Arc<DirectoryRegistry>) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, grant), fields(grant_id = %grant.id, provider = %grant.provider))]
    pub async fn execute(&self, grant: &Grant) -> RevocationOutcome {
        let Some(client) = self.registry.get(&grant.provider) else {
            warn!("No directory client registered for provider");
            return RevocationOutcome::failed(
                grant,
                FailureReason::UnknownProvider {
                    provider: grant.provider.clone(),
                },
            );
        };
        let verifier = MembershipVerifier::new(client);

        let principal_id = match verifier.resolve(&grant.principal).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("Principal no longer exists");
                return RevocationOutcome::new(grant, OutcomeKind::SkippedAlreadyAbsent);
            }
            Err(e) => {
                warn!(error = %e, "Principal lookup failed");
                return RevocationOutcome::failed(grant, e);
            }
        };

        match verifier.has_membership(&grant.group, &principal_id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Membership already absent");
                return RevocationOutcome::new(grant, OutcomeKind::SkippedAlreadyAbsent);
            }
            Err(e) => {
                warn!(error = %e, "Membership check failed");
                return RevocationOutcome::failed(grant, e);
            }
        }

        match verifier
            .client()
            .remove_member(&grant.group, &principal_id)
            .await
        {
            Ok(Removal::Removed) => {
                info!(group = %grant.group, "Membership revoked");
                RevocationOutcome::new(grant, OutcomeKind::Revoked)
            }
            Ok(Removal::NotFound) => {
                debug!("Membership disappeared before removal");
                RevocationOutcome::new(grant, OutcomeKind::SkippedAlreadyAbsent)
            }
            Err(e) => {
                warn!(error = %e, "Membership removal failed");
                RevocationOutcome::failed(grant, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunset_core::ProviderTag;
    use sunset_directory::{DirectoryOp, InMemoryDirectory, ProviderError};

    fn setup() -> (Arc<InMemoryDirectory>, RevocationExecutor) {
        let directory = Arc::new(InMemoryDirectory::named("entra"));
        let registry = DirectoryRegistry::new().with(ProviderTag::ENTRA, directory.clone());
        (directory, RevocationExecutor::new(Arc::new(registry)))
    }

    fn grant(principal: &str) -> Grant {
        Grant::new(principal, "g-finance", ProviderTag::ENTRA, "CHG-1")
    }

    #[tokio::test]
    async fn test_revokes_existing_membership() {
        let (directory, executor) = setup();
        directory.add_member("g-finance", "alice");

        let outcome = executor.execute(&grant("alice")).await;

        assert_eq!(outcome.kind, OutcomeKind::Revoked);
        assert!(!directory.has_member(&"g-finance".into(), &"alice".into()));
    }

    #[tokio::test]
    async fn test_absent_principal_skips_without_removal() {
        let (directory, executor) = setup();

        let outcome = executor.execute(&grant("bob")).await;

        assert_eq!(outcome.kind, OutcomeKind::SkippedAlreadyAbsent);
        assert_eq!(directory.calls(DirectoryOp::IsMember), 0);
        assert_eq!(directory.calls(DirectoryOp::RemoveMember), 0);
    }

    #[tokio::test]
    async fn test_non_member_skips_without_removal() {
        let (directory, executor) = setup();
        directory.add_group("g-finance");
        directory.add_principal("carol");

        let outcome = executor.execute(&grant("carol")).await;

        assert_eq!(outcome.kind, OutcomeKind::SkippedAlreadyAbsent);
        assert_eq!(directory.calls(DirectoryOp::RemoveMember), 0);
    }

    #[tokio::test]
    async fn test_removal_not_found_is_already_absent() {
        let (directory, executor) = setup();
        directory.add_member("g-finance", "dave");
        directory.vanish_before_removal("dave");

        let outcome = executor.execute(&grant("dave")).await;

        assert_eq!(outcome.kind, OutcomeKind::SkippedAlreadyAbsent);
        assert_eq!(directory.calls(DirectoryOp::RemoveMember), 1);
    }

    #[tokio::test]
    async fn test_provider_error_is_failure() {
        let (directory, executor) = setup();
        directory.add_member("g-finance", "erin");
        directory.fail(
            DirectoryOp::RemoveMember,
            "erin",
            ProviderError::RateLimited {
                retry_after_secs: Some(5),
            },
        );

        let outcome = executor.execute(&grant("erin")).await;

        assert_eq!(
            outcome.kind,
            OutcomeKind::Failed(FailureReason::Provider {
                error: ProviderError::RateLimited {
                    retry_after_secs: Some(5)
                }
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let (directory, executor) = setup();
        let g = Grant::new("alice", "g-finance", "okta", "CHG-1");

        let outcome = executor.execute(&g).await;

        assert_eq!(
            outcome.kind,
            OutcomeKind::Failed(FailureReason::UnknownProvider {
                provider: "okta".into()
            })
        );
        assert_eq!(directory.total_calls(), 0);
    }
}
