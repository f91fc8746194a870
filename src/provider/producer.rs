use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use super::{Candidates, ProviderError, ServiceMode};
use crate::config::EngineConfig;
use crate::host::{DefinitionSource, DeploymentListener, ProcessDataService};

/// Hands out [`ProcessDataService`] instances according to a [`ServiceMode`].
///
/// The mode is fixed at construction. A singleton is created on the first
/// successful `produce` and lives as long as the producer.
pub struct ServiceProducer {
    config: EngineConfig,
    sources: Candidates<dyn DefinitionSource>,
    listeners: Vec<Arc<dyn DeploymentListener>>,
    singleton: OnceCell<Arc<ProcessDataService>>,
}

impl ServiceProducer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sources: Candidates::new("definition source"),
            listeners: Vec::new(),
            singleton: OnceCell::new(),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DefinitionSource>) -> Self {
        self.sources.register(source);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn DeploymentListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn mode(&self) -> ServiceMode {
        self.config.service_mode
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Produce a service, or `None` when producing is disabled.
    pub fn produce(&self) -> Result<Option<Arc<ProcessDataService>>, ProviderError> {
        match self.config.service_mode {
            ServiceMode::None => {
                trace!("service producer disabled");
                Ok(None)
            }
            ServiceMode::Singleton => self
                .singleton
                .get_or_try_init(|| self.create().map(Arc::new))
                .map(|service| Some(service.clone())),
            ServiceMode::New => self.create().map(|service| Some(Arc::new(service))),
        }
    }

    fn create(&self) -> Result<ProcessDataService, ProviderError> {
        let mut service = ProcessDataService::from_config(&self.config);
        if let Some(source) = self.sources.resolve_unique()? {
            service = service.with_source(source);
        }
        for listener in &self.listeners {
            service.add_listener(listener.clone());
        }
        debug!(
            mode = %self.config.service_mode,
            listeners = self.listeners.len(),
            "created data service"
        );
        Ok(service)
    }
}

impl std::fmt::Debug for ServiceProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProducer")
            .field("mode", &self.config.service_mode)
            .field("sources", &self.sources)
            .field("listeners", &self.listeners.len())
            .field("initialised", &self.singleton.get().is_some())
            .finish()
    }
}
