//! Helpers for setting up data services.

use std::sync::Arc;

use bpmn_meta::host::{DeployedDefinition, InMemorySource, ProcessDataService};

use super::source_fixtures::deployable;

/// A service with every deployable fixture deployed under `kb`.
pub fn deployed_service() -> ProcessDataService {
    let service = ProcessDataService::new();
    for (id, text) in deployable() {
        let entry = service
            .deploy("kb", text)
            .unwrap_or_else(|e| panic!("fixture {id} failed to deploy: {e}"));
        assert_eq!(entry.process_id(), id);
    }
    service
}

/// A service that builds fixtures lazily from an in-memory source.
pub fn lazy_service() -> (ProcessDataService, Arc<InMemorySource>) {
    let source = Arc::new(InMemorySource::new());
    for (id, text) in deployable() {
        source.insert(id, DeployedDefinition::new("kb", text));
    }
    let service = ProcessDataService::new().with_source(source.clone());
    (service, source)
}
