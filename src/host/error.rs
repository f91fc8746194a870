//! Errors surfaced by the service façade.

use thiserror::Error;

use crate::hir::{BuildError, ResolutionErrors};
use crate::parser::ParseError;

/// Failure of a deploy, a strict lookup, or a descriptor query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("resolution failed: {0}")]
    Resolution(#[from] ResolutionErrors),

    /// No process with this id is deployed.
    #[error("process `{process_id}` not found")]
    NotFound { process_id: String },
}

impl ServiceError {
    pub fn not_found(process_id: impl Into<String>) -> Self {
        Self::NotFound {
            process_id: process_id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
