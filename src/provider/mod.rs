//! Service lifecycle for embedding runtimes.
//!
//! A runtime without a container builds one [`ServiceProducer`] from its
//! [`EngineConfig`](crate::config::EngineConfig) and asks it for services:
//!
//! | mode        | `produce()`                                |
//! |-------------|--------------------------------------------|
//! | `none`      | `Ok(None)`                                 |
//! | `singleton` | the same instance on every call            |
//! | `new`       | a fresh instance on every call             |
//!
//! Collaborators are registered as [`Candidates`]; registering the same
//! instance twice is harmless, two different instances are ambiguous.

mod candidates;
mod mode;
mod producer;

pub use candidates::Candidates;
pub use mode::ServiceMode;
pub use producer::ServiceProducer;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// More than one distinct instance registered for one collaborator.
    #[error("ambiguous {collaborator}: {count} distinct candidates registered")]
    AmbiguousResolution {
        collaborator: &'static str,
        count: usize,
    },

    #[error("unknown service mode `{value}` (expected none, singleton or new)")]
    UnknownMode { value: String },
}
