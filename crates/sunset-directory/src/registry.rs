//! Provider-tag to client binding.

use std::collections::HashMap;
use std::sync::Arc;

use sunset_core::ProviderTag;
use tracing::debug;

use crate::traits::DirectoryClient;

/// Shared handle to a directory client.
pub type SharedDirectoryClient = Arc<dyn DirectoryClient>;

/// Maps each provider tag to the one client that serves it.
///
/// The registry is assembled at startup and read concurrently afterwards,
/// so it carries no interior mutability.
#[derive(Clone, Default)]
pub struct DirectoryRegistry {
    clients: HashMap<ProviderTag, SharedDirectoryClient>,
}

impl DirectoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to `client`, replacing any previous binding.
    pub fn register(&mut self, tag: impl Into<ProviderTag>, client: SharedDirectoryClient) {
        let tag = tag.into();
        debug!(provider = %tag, client = client.provider_name(), "Registering directory client");
        self.clients.insert(tag, client);
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, tag: impl Into<ProviderTag>, client: SharedDirectoryClient) -> Self {
        self.register(tag, client);
        self
    }

    /// Client bound to `tag`, if any.
    pub fn get(&self, tag: &ProviderTag) -> Option<SharedDirectoryClient> {
        self.clients.get(tag).cloned()
    }

    /// All registered tags, sorted.
    pub fn tags(&self) -> Vec<&ProviderTag> {
        let mut tags: Vec<_> = self.clients.keys().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl std::fmt::Debug for DirectoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
