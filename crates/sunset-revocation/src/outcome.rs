//! Per-grant results of a revocation pass.

use serde::Serialize;
use sunset_core::{Grant, GrantId, GroupId, PrincipalKey, ProviderTag};
use sunset_directory::ProviderError;

/// Why a grant could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// A provider call failed.
    Provider { error: ProviderError },
    /// The change record could not be fetched, so no decision was possible.
    PolicyEvaluation { message: String },
    /// The pass deadline passed before this grant finished.
    DeadlineExceeded,
    /// No directory client is registered for the grant's provider tag.
    UnknownProvider { provider: ProviderTag },
    /// The worker task for this grant panicked or was cancelled.
    Aborted { message: String },
}

impl From<ProviderError> for FailureReason {
    fn from(error: ProviderError) -> Self {
        FailureReason::Provider { error }
    }
}

/// Classification of one grant's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The membership existed and was removed during this pass.
    Revoked,
    /// Nothing to remove: the principal, group or membership was already gone.
    SkippedAlreadyAbsent,
    /// The policy decided the grant should stay.
    SkippedPolicyNotEligible,
    Failed(FailureReason),
}

impl OutcomeKind {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, OutcomeKind::Failed(_))
    }
}

/// Outcome for one grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevocationOutcome {
    pub grant_id: GrantId,
    pub principal: PrincipalKey,
    pub group: GroupId,
    pub provider: ProviderTag,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

impl RevocationOutcome {
    pub fn new(grant: &Grant, kind: OutcomeKind) -> Self {
        Self {
            grant_id: grant.id,
            principal: grant.principal.clone(),
            group: grant.group.clone(),
            provider: grant.provider.clone(),
            kind,
        }
    }

    pub fn failed(grant: &Grant, reason: impl Into<FailureReason>) -> Self {
        Self::new(grant, OutcomeKind::Failed(reason.into()))
    }
}

/// Counts per outcome kind for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub total: usize,
    pub revoked: usize,
    pub already_absent: usize,
    pub not_eligible: usize,
    pub failed: usize,
    /// Subset of `failed` that ran out of time.
    pub failed_timeouts: usize,
}

impl PassSummary {
    pub fn from_outcomes(outcomes: &[RevocationOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            summary.total += 1;
            match &outcome.kind {
                OutcomeKind::Revoked => summary.revoked += 1,
                OutcomeKind::SkippedAlreadyAbsent => summary.already_absent += 1,
                OutcomeKind::SkippedPolicyNotEligible => summary.not_eligible += 1,
                OutcomeKind::Failed(reason) => {
                    summary.failed += 1;
                    if *reason == FailureReason::DeadlineExceeded {
                        summary.failed_timeouts += 1;
                    }
                }
            }
            summary
        })
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
