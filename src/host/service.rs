//! The query façade over the descriptor cache.
//!
//! `ProcessDataService` owns the cache and the pipeline:
//!
//! ```text
//! query(id) ──▶ cache.get ──hit──▶ clone view
//!                  │
//!                 miss
//!                  ▼
//!          build_lock(id) ──▶ re-check ──▶ DefinitionSource
//!                                              │
//!                                 parse → build → project
//!                                              │
//!                                       put_if_absent
//! ```
//!
//! `undeploy` retires an id: the source is no longer consulted for it and a
//! build already in flight is discarded.
//!
//! Simple getters are total: an unknown id, a missing source or a failed
//! lazy build all read as empty.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::cache::{CacheEntry, DescriptorCache};
use super::deploy::{DefinitionSource, DeploymentEvent, DeploymentListener};
use super::error::ServiceError;
use crate::base::constants::DEFAULT_DEPLOYMENT_ID;
use crate::config::EngineConfig;
use crate::hir::{
    BuildOptions, ModelBuilder, ProcessAssetDescriptor, ProcessModel, ResolutionContext,
    TaskDefinition, validate_types, views,
};
use crate::parser::parse;

// ============================================================================
// QUERY SURFACE
// ============================================================================

/// Metadata queries a workflow runtime issues against deployed processes.
pub trait Bpmn2DataService: Send + Sync {
    /// Entity data objects: name → entity kind.
    fn associated_entities(&self, process_id: &str) -> IndexMap<String, String>;

    /// Distinct types referenced by data objects and mappings.
    fn associated_domain_objects(&self, process_id: &str) -> Vec<String>;

    /// Process variables: name → type.
    fn process_data(&self, process_id: &str) -> IndexMap<String, String>;

    fn associated_forms(&self, process_id: &str) -> Vec<String>;

    fn all_task_defs(&self, process_id: &str) -> Vec<TaskDefinition>;

    /// Descriptor of a deployed process; `NotFound` when there is none.
    fn process_desc(&self, process_id: &str) -> Result<ProcessAssetDescriptor, ServiceError>;

    /// Data input → source expression for one task.
    fn task_input_mappings(&self, process_id: &str, task_name: &str) -> IndexMap<String, String>;

    /// Process variable → data output for one task.
    fn task_output_mappings(&self, process_id: &str, task_name: &str) -> IndexMap<String, String>;

    fn reusable_subprocesses(&self, process_id: &str) -> IndexSet<String>;

    /// Analyse content that is not deployed, validating every type reference.
    ///
    /// Never reads or writes the cache.
    fn find_process_id(
        &self,
        content: &str,
        ctx: &dyn ResolutionContext,
    ) -> Result<ProcessAssetDescriptor, ServiceError>;

    /// Service task name → implementation class.
    fn all_service_tasks(&self, process_id: &str) -> IndexMap<String, String>;
}

// ============================================================================
// SERVICE
// ============================================================================

/// Cached implementation of [`Bpmn2DataService`].
pub struct ProcessDataService {
    cache: DescriptorCache,
    options: BuildOptions,
    /// Deployment unit reported for content with no deployment of its own.
    deployment_id: String,
    source: Option<Arc<dyn DefinitionSource>>,
    listeners: RwLock<Vec<Arc<dyn DeploymentListener>>>,
}

impl Default for ProcessDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessDataService {
    pub fn new() -> Self {
        Self {
            cache: DescriptorCache::new(),
            options: BuildOptions::default(),
            deployment_id: DEFAULT_DEPLOYMENT_ID.to_string(),
            source: None,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            options: config.build_options(),
            deployment_id: config.deployment_id.clone(),
            ..Self::new()
        }
    }

    /// Fetch definitions from `source` on a cache miss.
    pub fn with_source(mut self, source: Arc<dyn DefinitionSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn add_listener(&self, listener: Arc<dyn DeploymentListener>) {
        self.listeners.write().push(listener);
    }

    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    pub fn deployment_id(&self) -> &str {
        &self.deployment_id
    }

    // ── Deployment ──────────────────────────────────────────────────

    /// Build `content` and publish it, replacing any older entry.
    ///
    /// On failure nothing is published and the older entry stays.
    pub fn deploy(
        &self,
        deployment_id: &str,
        content: impl Into<Arc<str>>,
    ) -> Result<Arc<CacheEntry>, ServiceError> {
        let model = self.compile(content.into())?;
        let entry = {
            let lock = self.cache.build_lock(&model.id);
            let _guard = lock.lock();
            self.cache.put(CacheEntry::new(model, deployment_id))
        };
        debug!(
            process = entry.process_id(),
            deployment = deployment_id,
            generation = entry.generation,
            "deployed process"
        );
        for listener in self.listeners() {
            listener.on_deployed(&entry);
        }
        Ok(entry)
    }

    /// Drop the cached entry for `process_id` and stop the definition source
    /// from rebuilding it until the next [`deploy`](Self::deploy).
    ///
    /// Returns whether an entry was cached. A lazy build that is in flight
    /// when this runs is discarded instead of published.
    pub fn undeploy(&self, process_id: &str) -> bool {
        if self.cache.retire(process_id).is_none() {
            return false;
        }
        debug!(process = process_id, "undeployed process");
        for listener in self.listeners() {
            listener.on_undeployed(process_id);
        }
        true
    }

    /// Snapshot of the listeners, so none is called under the lock.
    fn listeners(&self) -> Vec<Arc<dyn DeploymentListener>> {
        self.listeners.read().clone()
    }

    pub fn handle_event(&self, event: DeploymentEvent) -> Result<(), ServiceError> {
        match event {
            DeploymentEvent::Deployed {
                deployment_id,
                content,
            } => self.deploy(&deployment_id, content).map(|_| ()),
            DeploymentEvent::Undeployed { process_id } => {
                self.undeploy(&process_id);
                Ok(())
            }
        }
    }

    // ── Pipeline ────────────────────────────────────────────────────

    fn compile(&self, content: Arc<str>) -> Result<Arc<ProcessModel>, ServiceError> {
        let tree = parse(&content)?;
        let model = ModelBuilder::new(self.options.clone()).build(&tree, content)?;
        Ok(Arc::new(model))
    }

    /// The cached entry for `process_id`, building it from the source on a miss.
    pub fn entry(&self, process_id: &str) -> Option<Arc<CacheEntry>> {
        if let Some(entry) = self.cache.get(process_id) {
            return Some(entry);
        }
        let source = self.source.as_ref()?;

        let lock = self.cache.build_lock(process_id);
        let _guard = lock.lock();
        if let Some(entry) = self.cache.get(process_id) {
            return Some(entry);
        }
        if self.cache.is_retired(process_id) {
            return None;
        }

        let definition = source.definition(process_id)?;
        let model = match self.compile(definition.content) {
            Ok(model) => model,
            Err(err) => {
                warn!(process = process_id, error = %err, "lazy build failed");
                return None;
            }
        };
        if model.id != process_id {
            warn!(
                requested = process_id,
                found = %model.id,
                "definition source returned a different process"
            );
            return None;
        }
        self.cache
            .put_if_absent(CacheEntry::new(model, definition.deployment_id))
    }

    fn view<T: Default>(&self, process_id: &str, f: impl FnOnce(&CacheEntry) -> T) -> T {
        self.entry(process_id)
            .map(|entry| f(&entry))
            .unwrap_or_default()
    }
}

impl Bpmn2DataService for ProcessDataService {
    fn associated_entities(&self, process_id: &str) -> IndexMap<String, String> {
        self.view(process_id, |e| e.views.entities.clone())
    }

    fn associated_domain_objects(&self, process_id: &str) -> Vec<String> {
        self.view(process_id, |e| e.views.domain_objects.clone())
    }

    fn process_data(&self, process_id: &str) -> IndexMap<String, String> {
        self.view(process_id, |e| e.views.process_data.clone())
    }

    fn associated_forms(&self, process_id: &str) -> Vec<String> {
        self.view(process_id, |e| e.views.forms.clone())
    }

    fn all_task_defs(&self, process_id: &str) -> Vec<TaskDefinition> {
        self.view(process_id, |e| e.views.task_definitions.clone())
    }

    fn process_desc(&self, process_id: &str) -> Result<ProcessAssetDescriptor, ServiceError> {
        self.entry(process_id)
            .map(|e| e.views.descriptor.clone())
            .ok_or_else(|| ServiceError::not_found(process_id))
    }

    fn task_input_mappings(&self, process_id: &str, task_name: &str) -> IndexMap<String, String> {
        self.view(process_id, |e| views::task_input_mappings(&e.model, task_name))
    }

    fn task_output_mappings(&self, process_id: &str, task_name: &str) -> IndexMap<String, String> {
        self.view(process_id, |e| views::task_output_mappings(&e.model, task_name))
    }

    fn reusable_subprocesses(&self, process_id: &str) -> IndexSet<String> {
        self.view(process_id, |e| e.views.reusable_subprocesses.clone())
    }

    fn find_process_id(
        &self,
        content: &str,
        ctx: &dyn ResolutionContext,
    ) -> Result<ProcessAssetDescriptor, ServiceError> {
        let tree = parse(content)?;
        let model = ModelBuilder::new(self.options.clone()).build(&tree, content)?;
        validate_types(&model, ctx)?;

        let deployment_id = ctx.deployment_id().unwrap_or(self.deployment_id.as_str());
        debug!(process = %model.id, deployment = deployment_id, "validated definition");
        Ok(views::descriptor(&model, deployment_id))
    }

    fn all_service_tasks(&self, process_id: &str) -> IndexMap<String, String> {
        self.view(process_id, |e| e.views.service_tasks.clone())
    }
}

impl std::fmt::Debug for ProcessDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessDataService")
            .field("cache", &self.cache)
            .field("deployment_id", &self.deployment_id)
            .field("has_source", &self.source.is_some())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
