//! Host layer: cached, thread-safe access to process metadata.
//!
//! [`ProcessDataService`] owns a [`DescriptorCache`] and answers the
//! [`Bpmn2DataService`] queries from it, running the parse → build → project
//! pipeline on a miss. Deployment notifications flow in through
//! [`DeploymentEvent`] and out through [`DeploymentListener`].

mod cache;
pub mod deploy;
mod error;
mod service;

pub use cache::{CacheEntry, DescriptorCache};
pub use deploy::{
    DefinitionSource, DeployedDefinition, DeploymentEvent, DeploymentListener, InMemorySource,
};
pub use error::ServiceError;
pub use service::{Bpmn2DataService, ProcessDataService};
