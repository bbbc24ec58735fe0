//! Revocation pass orchestration.
//!
//! A pass runs in three phases, all under one wall-clock deadline:
//!
//! 1. list active grants (the only step whose failure aborts the pass);
//! 2. fetch each distinct change record and apply the policy;
//! 3. run the executor for every eligible grant on a bounded pool.
//!
//! Whatever has not finished when the deadline hits is aborted and reported
//! as [`FailureReason::DeadlineExceeded`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use sunset_core::{ChangeRecord, ChangeRef, Grant};
use sunset_directory::DirectoryRegistry;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

use crate::change_source::ChangeSource;
use crate::error::{ChangeSourceError, ChangeSourceResult, RevocationError};
use crate::executor::RevocationExecutor;
use crate::outcome::{FailureReason, OutcomeKind, PassSummary, RevocationOutcome};
use crate::policy::RevocationPolicy;

/// Coordinator limits.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum number of grants processed at once. Each grant issues its
    /// provider calls sequentially, so this also caps in-flight provider
    /// calls.
    pub concurrency: usize,

    /// Maximum number of change records fetched at once.
    pub change_fetch_concurrency: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            change_fetch_concurrency: 16,
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_change_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.change_fetch_concurrency = concurrency;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if either limit is zero.
    pub fn validate(&self) -> Result<(), RevocationError> {
        if self.concurrency == 0 {
            return Err(RevocationError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        if self.change_fetch_concurrency == 0 {
            return Err(RevocationError::InvalidConfig(
                "change_fetch_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Point in time by which a pass must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    #[must_use]
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// Deadline `remaining` from now.
    #[must_use]
    pub fn after(remaining: Duration) -> Self {
        Self(Instant::now() + remaining)
    }

    #[must_use]
    pub fn instant(&self) -> Instant {
        self.0
    }

    #[must_use]
    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.0
    }
}

impl From<Instant> for Deadline {
    fn from(instant: Instant) -> Self {
        Self::at(instant)
    }
}

impl From<Duration> for Deadline {
    fn from(remaining: Duration) -> Self {
        Self::after(remaining)
    }
}

/// Runs revocation passes.
pub struct RevocationCoordinator {
    source: Arc<dyn ChangeSource>,
    policy: Arc<dyn RevocationPolicy>,
    executor: RevocationExecutor,
    config: CoordinatorConfig,
}

impl std::fmt::Debug for RevocationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationCoordinator")
            .field("executor", &self.executor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RevocationCoordinator {
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` does not validate.
    pub fn new(
        source: Arc<dyn ChangeSource>,
        registry: Arc<DirectoryRegistry>,
        policy: Arc<dyn RevocationPolicy>,
        config: CoordinatorConfig,
    ) -> Result<Self, RevocationError> {
        config.validate()?;
        Ok(Self {
            source,
            policy,
            executor: RevocationExecutor::new(registry),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Runs one pass and returns exactly one outcome per active grant, in no
    /// particular order.
    ///
    /// # Errors
    ///
    /// Returns `GrantListUnavailable` if the active grants cannot be listed
    /// before the deadline. Every other failure is reported per grant.
    #[instrument(skip_all, fields(concurrency = self.config.concurrency))]
    pub async fn run_revocation_pass(
        &self,
        deadline: impl Into<Deadline>,
    ) -> Result<Vec<RevocationOutcome>, RevocationError> {
        let deadline = deadline.into();
        let as_of = Utc::now();

        let grants = match timeout_at(deadline.instant(), self.source.active_grants()).await {
            Ok(Ok(grants)) => grants,
            Ok(Err(e)) => return Err(RevocationError::GrantListUnavailable(e)),
            Err(_) => {
                return Err(RevocationError::GrantListUnavailable(
                    ChangeSourceError::Unavailable(
                        "deadline reached while listing active grants".into(),
                    ),
                ))
            }
        };
        info!(grants = grants.len(), "Starting revocation pass");

        let records = self.fetch_change_records(&grants, deadline).await;

        let mut outcomes = Vec::with_capacity(grants.len());
        let mut eligible = Vec::new();
        for grant in grants {
            match records.get(&grant.change_ref) {
                Some(Ok(record)) => {
                    if self.policy.should_revoke(&grant, record, as_of) {
                        eligible.push(grant);
                    } else {
                        outcomes.push(RevocationOutcome::new(
                            &grant,
                            OutcomeKind::SkippedPolicyNotEligible,
                        ));
                    }
                }
                Some(Err(e)) => {
                    warn!(grant_id = %grant.id, change_ref = %grant.change_ref, error = %e, "Change record unavailable");
                    outcomes.push(RevocationOutcome::failed(
                        &grant,
                        FailureReason::PolicyEvaluation {
                            message: e.to_string(),
                        },
                    ));
                }
                None => outcomes.push(RevocationOutcome::failed(
                    &grant,
                    FailureReason::DeadlineExceeded,
                )),
            }
        }
        debug!(eligible = eligible.len(), "Policy evaluated");

        self.execute_eligible(eligible, deadline, &mut outcomes).await;

        let summary = PassSummary::from_outcomes(&outcomes);
        info!(
            total = summary.total,
            revoked = summary.revoked,
            already_absent = summary.already_absent,
            not_eligible = summary.not_eligible,
            failed = summary.failed,
            failed_timeouts = summary.failed_timeouts,
            "Revocation pass finished"
        );

        Ok(outcomes)
    }

    /// Fetches every distinct change record once. Refs missing from the
    /// result were not fetched before the deadline.
    async fn fetch_change_records(
        &self,
        grants: &[Grant],
        deadline: Deadline,
    ) -> HashMap<ChangeRef, ChangeSourceResult<ChangeRecord>> {
        let refs: BTreeSet<ChangeRef> = grants.iter().map(|g| g.change_ref.clone()).collect();
        let mut records = HashMap::with_capacity(refs.len());
        let source = &self.source;

        let fetch_all = async {
            let mut fetches = stream::iter(refs)
                .map(|change_ref| async move {
                    let result = source.fetch_change_record(&change_ref).await;
                    (change_ref, result)
                })
                .buffer_unordered(self.config.change_fetch_concurrency);

            while let Some((change_ref, result)) = fetches.next().await {
                records.insert(change_ref, result);
            }
        };

        let timed_out = timeout_at(deadline.instant(), fetch_all).await.is_err();

        if timed_out {
            warn!(fetched = records.len(), "Deadline reached while fetching change records");
        }
        records
    }

    async fn execute_eligible(
        &self,
        eligible: Vec<Grant>,
        deadline: Deadline,
        outcomes: &mut Vec<RevocationOutcome>,
    ) {
        if eligible.is_empty() {
            return;
        }
        if deadline.has_passed() {
            warn!(unfinished = eligible.len(), "Deadline reached before dispatch");
            outcomes.extend(
                eligible
                    .iter()
                    .map(|g| RevocationOutcome::failed(g, FailureReason::DeadlineExceeded)),
            );
            return;
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(eligible.len());

        for grant in eligible {
            let semaphore = semaphore.clone();
            let executor = self.executor.clone();
            let task_grant = grant.clone();
            let handle = tasks.spawn(async move {
                // Held for the whole resolve/check/remove sequence.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return RevocationOutcome::failed(
                        &task_grant,
                        FailureReason::Aborted {
                            message: "worker pool closed".into(),
                        },
                    );
                };
                executor.execute(&task_grant).await
            });
            pending.insert(handle.id(), grant);
        }

        let join_all = async {
            while let Some(joined) = tasks.join_next_with_id().await {
                match joined {
                    Ok((id, outcome)) => {
                        pending.remove(&id);
                        outcomes.push(outcome);
                    }
                    Err(e) => {
                        if let Some(grant) = pending.remove(&e.id()) {
                            warn!(grant_id = %grant.id, error = %e, "Revocation task failed");
                            outcomes.push(RevocationOutcome::failed(
                                &grant,
                                FailureReason::Aborted {
                                    message: e.to_string(),
                                },
                            ));
                        }
                    }
                }
            }
        };
        let timed_out = timeout_at(deadline.instant(), join_all).await.is_err();

        if timed_out {
            tasks.abort_all();
            warn!(unfinished = pending.len(), "Deadline reached, abandoning unfinished grants");
            outcomes.extend(
                pending
                    .into_values()
                    .map(|g| RevocationOutcome::failed(&g, FailureReason::DeadlineExceeded)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_validation() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.change_fetch_concurrency, 16);
        assert!(config.validate().is_ok());

        assert!(matches!(
            CoordinatorConfig::default().with_concurrency(0).validate(),
            Err(RevocationError::InvalidConfig(_))
        ));
        assert!(matches!(
            CoordinatorConfig::default()
                .with_change_fetch_concurrency(0)
                .validate(),
            Err(RevocationError::InvalidConfig(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_from_duration() {
        let start = Instant::now();
        let deadline = Deadline::from(Duration::from_secs(5));
        assert_eq!(deadline.instant(), start + Duration::from_secs(5));
        assert!(!deadline.has_passed());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(deadline.has_passed());
    }
}
