//! # bpmn-meta
//!
//! Static analysis of BPMN2 process definitions: parse the document, build a
//! semantic model, and serve cached metadata views to a workflow runtime.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! provider  → Service lifecycle (none / singleton / new)
//!   ↓
//! host      → Descriptor cache, query façade, deployment events
//!   ↓
//! hir       → Semantic model, builder, views, type resolution
//!   ↓
//! syntax    → Element tree
//!   ↓
//! parser    → quick-xml reader, ParseError
//!   ↓
//! base      → Primitives (Position, LineIndex, TextRange, constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → host → provider)
// ============================================================================

/// Foundation types: positions, text ranges, domain constants
pub mod base;

/// Parser: document text to element tree
pub mod parser;

/// Syntax: the element tree
pub mod syntax;

/// High-level IR: process model, builder, projections
pub mod hir;

/// Host: cached query service and deployment boundary
pub mod host;

/// Service producer with configurable lifecycle
pub mod provider;

/// Engine configuration
pub mod config;

// Re-export the query surface
pub use config::{ConfigError, EngineConfig};
pub use hir::{
    BuildError, ProcessAssetDescriptor, ProcessModel, ResolutionContext, ResolutionErrors,
    TaskDefinition,
};
pub use host::{Bpmn2DataService, DeploymentEvent, ProcessDataService, ServiceError};
pub use parser::{ParseError, parse};
pub use provider::{ServiceMode, ServiceProducer};

// Re-export foundation types
pub use base::{LineIndex, Position, TextRange, TextSize};
