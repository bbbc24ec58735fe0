//! Shared fixtures for revocation engine tests.

#![allow(dead_code)]

use std::sync::Arc;

use sunset_core::{ChangeRecord, ChangeStatus, Grant, ProviderTag};
use sunset_directory::{DirectoryRegistry, InMemoryDirectory, SharedDirectoryClient};
use sunset_revocation::{
    ChangeStatusPolicy, CoordinatorConfig, InMemoryChangeSource, OutcomeKind,
    RevocationCoordinator, RevocationOutcome,
};

/// One in-memory provider plus an in-memory change source.
pub struct Fixture {
    pub directory: Arc<InMemoryDirectory>,
    pub source: Arc<InMemoryChangeSource>,
    pub extra_clients: Vec<(ProviderTag, SharedDirectoryClient)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::named(ProviderTag::ENTRA)),
            source: Arc::new(InMemoryChangeSource::new()),
            extra_clients: Vec::new(),
        }
    }

    /// Adds a grant against the default provider and returns it.
    pub fn grant(&self, principal: &str, group: &str, change_ref: &str) -> Grant {
        let grant = Grant::new(principal, group, ProviderTag::ENTRA, change_ref);
        self.source.add_grant(grant.clone());
        grant
    }

    /// Adds a grant whose principal is a current member of `group`.
    pub fn member_grant(&self, principal: &str, group: &str, change_ref: &str) -> Grant {
        self.directory.add_member(group, principal);
        self.grant(principal, group, change_ref)
    }

    pub fn record(&self, change_ref: &str, status: ChangeStatus) {
        self.source.put_record(ChangeRecord::new(change_ref, status));
    }

    pub fn register(&mut self, tag: &str, client: SharedDirectoryClient) {
        self.extra_clients.push((ProviderTag::new(tag), client));
    }

    pub fn coordinator(&self, config: CoordinatorConfig) -> RevocationCoordinator {
        let mut registry = DirectoryRegistry::new().with(ProviderTag::ENTRA, self.directory.clone());
        for (tag, client) in &self.extra_clients {
            registry.register(tag.clone(), client.clone());
        }

        RevocationCoordinator::new(
            self.source.clone(),
            Arc::new(registry),
            Arc::new(ChangeStatusPolicy::new()),
            config,
        )
        .unwrap()
    }
}

/// Outcome kind for `grant`, panicking if there is not exactly one.
pub fn kind_of(outcomes: &[RevocationOutcome], grant: &Grant) -> OutcomeKind {
    let matching: Vec<_> = outcomes.iter().filter(|o| o.grant_id == grant.id).collect();
    assert_eq!(matching.len(), 1, "expected exactly one outcome for {}", grant.principal);
    matching[0].kind.clone()
}

pub fn count(outcomes: &[RevocationOutcome], kind: &OutcomeKind) -> usize {
    outcomes.iter().filter(|o| &o.kind == kind).count()
}
