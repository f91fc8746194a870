//! Boundary with the deployment subsystem.
//!
//! The deployment subsystem owns where definitions come from. The service
//! asks a [`DefinitionSource`] for content on a cache miss and reacts to
//! [`DeploymentEvent`]s; [`DeploymentListener`]s hear about every publish
//! and invalidation.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::cache::CacheEntry;

/// Raw content of one deployed definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedDefinition {
    pub deployment_id: String,
    pub content: Arc<str>,
}

impl DeployedDefinition {
    pub fn new(deployment_id: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            content: content.into(),
        }
    }
}

/// Supplies definition content for a process id on a cache miss.
pub trait DefinitionSource: Send + Sync {
    fn definition(&self, process_id: &str) -> Option<DeployedDefinition>;
}

/// A notification from the deployment subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentEvent {
    Deployed {
        deployment_id: String,
        content: Arc<str>,
    },
    Undeployed {
        process_id: String,
    },
}

/// Observer of cache publication and invalidation.
pub trait DeploymentListener: Send + Sync {
    fn on_deployed(&self, _entry: &CacheEntry) {}

    fn on_undeployed(&self, _process_id: &str) {}
}

/// In-memory [`DefinitionSource`] keyed by process id.
#[derive(Debug, Default)]
pub struct InMemorySource {
    definitions: RwLock<FxHashMap<String, DeployedDefinition>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, process_id: impl Into<String>, definition: DeployedDefinition) {
        self.definitions.write().insert(process_id.into(), definition);
    }

    pub fn remove(&self, process_id: &str) -> Option<DeployedDefinition> {
        self.definitions.write().remove(process_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

impl DefinitionSource for InMemorySource {
    fn definition(&self, process_id: &str) -> Option<DeployedDefinition> {
        self.definitions.read().get(process_id).cloned()
    }
}
