//! Errors raised while building a [`ProcessModel`](super::ProcessModel).
//!
//! Structural errors (missing or malformed references) and semantic errors
//! (duplicate or conflicting names) both abort the build: every view is
//! derived from one model, so a partial model is never published.

use thiserror::Error;

use super::model::{MappingDirection, TaskKind};

/// A fatal inconsistency in a process definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The document contains no `process` element.
    #[error("document contains no process element")]
    MissingProcess,

    /// A required attribute is absent.
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// An attribute value could not be interpreted.
    #[error("<{element}> has invalid `{attribute}` value {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },

    /// Two tasks share a name.
    #[error("task `{name}` is defined more than once")]
    DuplicateTaskDefinition { name: String },

    /// One name is used for tasks of different kinds.
    #[error("task `{name}` is declared as both {first} and {second}")]
    ConflictingTaskKind {
        name: String,
        first: TaskKind,
        second: TaskKind,
    },

    /// A data association points at a data item the task does not declare.
    #[error("task `{task}` maps unknown data item `{reference}`")]
    DanglingMapping { task: String, reference: String },

    /// Two mappings of one task write the same target.
    #[error("task `{task}` has more than one {direction} mapping to `{target}`")]
    DuplicateMapping {
        task: String,
        direction: MappingDirection,
        target: String,
    },

    /// A reference to an element or declaration that does not exist.
    #[error("<{element}> references unknown `{reference}`")]
    UnresolvedReference { element: String, reference: String },
}

impl BuildError {
    /// Create a missing attribute error.
    pub fn missing_attribute(element: impl Into<String>, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute,
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(
        element: impl Into<String>,
        attribute: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute,
            value: value.into(),
        }
    }

    /// Create an unresolved reference error.
    pub fn unresolved(element: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            element: element.into(),
            reference: reference.into(),
        }
    }

    /// True for errors about names colliding rather than broken structure.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTaskDefinition { .. }
                | Self::ConflictingTaskKind { .. }
                | Self::DuplicateMapping { .. }
        )
    }
}
