//! In-memory directory for tests and local runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sunset_core::{GroupId, PrincipalId, PrincipalKey};

use crate::error::{DirectoryResult, ProviderError};
use crate::traits::{DirectoryClient, Lookup, Removal};

/// Directory operations, used to target injected failures and to read
/// call counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryOp {
    ResolvePrincipal,
    IsMember,
    RemoveMember,
}

#[derive(Debug, Default)]
struct State {
    principals: HashMap<PrincipalKey, PrincipalId>,
    groups: HashSet<GroupId>,
    memberships: HashSet<(GroupId, PrincipalId)>,
    failures: HashMap<(DirectoryOp, String), ProviderError>,
    /// Principals whose removal should race with an external removal.
    vanishing: HashSet<PrincipalId>,
    latency: HashMap<DirectoryOp, Duration>,
}

#[derive(Debug, Default)]
struct Counters {
    resolve: AtomicUsize,
    is_member: AtomicUsize,
    remove: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Tracks one in-flight call; the drop also runs when a task is aborted
/// mid-call.
struct InFlight<'a>(&'a Counters);

impl<'a> InFlight<'a> {
    fn enter(counters: &'a Counters) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Directory backed by in-process maps.
///
/// Supports per-operation latency and injected failures so that the
/// revocation engine can be exercised without a network.
#[derive(Debug)]
pub struct InMemoryDirectory {
    name: String,
    state: Mutex<State>,
    counters: Counters,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::named("memory")
    }
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
            counters: Counters::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a principal. Its provider id is derived from the key.
    pub fn add_principal(&self, principal: impl Into<PrincipalKey>) -> PrincipalId {
        let principal = principal.into();
        let id = PrincipalId::new(format!("id-{principal}"));
        self.state().principals.insert(principal, id.clone());
        id
    }

    /// Add a group with no members.
    pub fn add_group(&self, group: impl Into<GroupId>) {
        self.state().groups.insert(group.into());
    }

    /// Add a principal to a group, creating both if needed.
    pub fn add_member(&self, group: impl Into<GroupId>, principal: impl Into<PrincipalKey>) {
        let group = group.into();
        let id = self.add_principal(principal);
        let mut state = self.state();
        state.groups.insert(group.clone());
        state.memberships.insert((group, id));
    }

    /// Fail `op` for the given principal key or provider id.
    pub fn fail(&self, op: DirectoryOp, principal: impl Into<String>, error: ProviderError) {
        self.state().failures.insert((op, principal.into()), error);
    }

    /// Make removals of `principal` answer `NotFound`, as if someone else
    /// removed the membership between the check and the removal.
    pub fn vanish_before_removal(&self, principal: impl Into<PrincipalKey>) {
        let principal = principal.into();
        let id = PrincipalId::new(format!("id-{principal}"));
        self.state().vanishing.insert(id);
    }

    /// Delay every call of `op` by `latency`.
    pub fn set_latency(&self, op: DirectoryOp, latency: Duration) {
        self.state().latency.insert(op, latency);
    }

    /// Delay every call by `latency`.
    pub fn set_latency_all(&self, latency: Duration) {
        for op in [
            DirectoryOp::ResolvePrincipal,
            DirectoryOp::IsMember,
            DirectoryOp::RemoveMember,
        ] {
            self.set_latency(op, latency);
        }
    }

    pub fn has_member(&self, group: &GroupId, principal: &PrincipalKey) -> bool {
        let state = self.state();
        state
            .principals
            .get(principal)
            .is_some_and(|id| state.memberships.contains(&(group.clone(), id.clone())))
    }

    /// Number of calls issued for `op`.
    pub fn calls(&self, op: DirectoryOp) -> usize {
        let counter = match op {
            DirectoryOp::ResolvePrincipal => &self.counters.resolve,
            DirectoryOp::IsMember => &self.counters.is_member,
            DirectoryOp::RemoveMember => &self.counters.remove,
        };
        counter.load(Ordering::SeqCst)
    }

    /// Total calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.calls(DirectoryOp::ResolvePrincipal)
            + self.calls(DirectoryOp::IsMember)
            + self.calls(DirectoryOp::RemoveMember)
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    /// Failures may be registered against either the key or the derived id.
    fn failure_keys(principal: &PrincipalId) -> [&str; 2] {
        let id = principal.as_str();
        [id, id.strip_prefix("id-").unwrap_or(id)]
    }

    async fn simulate(&self, op: DirectoryOp, keys: &[&str]) -> DirectoryResult<()> {
        let (latency, failure) = {
            let state = self.state();
            let failure = keys
                .iter()
                .find_map(|key| state.failures.get(&(op, (*key).to_string())).cloned());
            (state.latency.get(&op).copied(), failure)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn resolve_principal(
        &self,
        principal: &PrincipalKey,
    ) -> DirectoryResult<Lookup<PrincipalId>> {
        self.counters.resolve.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.counters);
        self.simulate(DirectoryOp::ResolvePrincipal, &[principal.as_str()])
            .await?;

        Ok(self.state().principals.get(principal).cloned().into())
    }

    async fn is_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Lookup<bool>> {
        self.counters.is_member.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.counters);
        self.simulate(DirectoryOp::IsMember, &Self::failure_keys(principal))
            .await?;

        let state = self.state();
        if !state.groups.contains(group) {
            return Ok(Lookup::NotFound);
        }
        Ok(Lookup::Found(
            state
                .memberships
                .contains(&(group.clone(), principal.clone())),
        ))
    }

    async fn remove_member(
        &self,
        group: &GroupId,
        principal: &PrincipalId,
    ) -> DirectoryResult<Removal> {
        self.counters.remove.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.counters);
        self.simulate(DirectoryOp::RemoveMember, &Self::failure_keys(principal))
            .await?;

        let mut state = self.state();
        let key = (group.clone(), principal.clone());
        if state.vanishing.contains(principal) {
            state.memberships.remove(&key);
            return Ok(Removal::NotFound);
        }
        if state.memberships.remove(&key) {
            Ok(Removal::Removed)
        } else {
            Ok(Removal::NotFound)
        }
    }
}
