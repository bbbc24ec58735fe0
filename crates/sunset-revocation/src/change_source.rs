//! Access to the change-tracking system: active grants and the change
//! records that justify them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sunset_core::{ChangeRecord, ChangeRef, Grant};

use crate::error::{ChangeSourceError, ChangeSourceResult};

/// Source of grants and change records.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// All grants that are currently active.
    async fn active_grants(&self) -> ChangeSourceResult<Vec<Grant>>;

    /// Current state of one change record.
    async fn fetch_change_record(&self, change_ref: &ChangeRef) -> ChangeSourceResult<ChangeRecord>;
}

#[derive(Debug, Default)]
struct State {
    grants: Vec<Grant>,
    records: HashMap<ChangeRef, ChangeRecord>,
    grant_list_failure: Option<ChangeSourceError>,
    record_failures: HashMap<ChangeRef, ChangeSourceError>,
    record_fetches: HashMap<ChangeRef, usize>,
    grant_list_latency: Option<Duration>,
    record_latency: Option<Duration>,
}

/// In-memory change source for tests and fixtures.
#[derive(Debug, Default)]
pub struct InMemoryChangeSource {
    state: Mutex<State>,
}

impl InMemoryChangeSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_grant(&self, grant: Grant) {
        self.state().grants.push(grant);
    }

    /// Insert or replace a change record.
    pub fn put_record(&self, record: ChangeRecord) {
        self.state()
            .records
            .insert(record.change_ref.clone(), record);
    }

    /// Make `active_grants` fail with `error`.
    pub fn fail_grant_list(&self, error: ChangeSourceError) {
        self.state().grant_list_failure = Some(error);
    }

    /// Make fetching `change_ref` fail with `error`.
    pub fn fail_record(&self, change_ref: impl Into<ChangeRef>, error: ChangeSourceError) {
        self.state()
            .record_failures
            .insert(change_ref.into(), error);
    }

    pub fn set_grant_list_latency(&self, latency: Duration) {
        self.state().grant_list_latency = Some(latency);
    }

    pub fn set_record_latency(&self, latency: Duration) {
        self.state().record_latency = Some(latency);
    }

    /// How often `change_ref` was fetched.
    pub fn record_fetches(&self, change_ref: &ChangeRef) -> usize {
        self.state()
            .record_fetches
            .get(change_ref)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChangeSource for InMemoryChangeSource {
    async fn active_grants(&self) -> ChangeSourceResult<Vec<Grant>> {
        let latency = self.state().grant_list_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state();
        match &state.grant_list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.grants.clone()),
        }
    }

    async fn fetch_change_record(&self, change_ref: &ChangeRef) -> ChangeSourceResult<ChangeRecord> {
        let latency = {
            let mut state = self.state();
            *state.record_fetches.entry(change_ref.clone()).or_default() += 1;
            state.record_latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state();
        if let Some(error) = state.record_failures.get(change_ref) {
            return Err(error.clone());
        }
        state
            .records
            .get(change_ref)
            .cloned()
            .ok_or_else(|| ChangeSourceError::NotFound(change_ref.to_string()))
    }
}
