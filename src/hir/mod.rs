//! High-level IR (HIR): the semantic model of a process definition.
//!
//! ## Layers
//!
//! ```text
//! ElementTree               ← syntax, from the parser
//!     │
//!     ▼
//! ModelBuilder::build       ← classify elements, record indexes
//!     │
//!     ▼
//! ProcessModel              ← immutable, shared behind Arc
//!     │
//!     ├──▶ views::*         ← metadata projections
//!     └──▶ validate_types   ← strict path only
//! ```
//!
//! ## Key Types
//!
//! - [`ProcessModel`] and its [`ProcessElement`] variants
//! - [`TaskDefinition`] for each named task
//! - [`ProcessViews`] / [`ProcessAssetDescriptor`] for the query surface
//! - [`ResolutionContext`] for loading external type names

mod builder;
mod errors;
mod model;
mod resolve;
pub mod views;

pub use builder::{BuildOptions, ModelBuilder, build_model};
pub use errors::BuildError;
pub use model::{
    Association, BoundaryEvent, DataObject, DataTag, FormRef, Lane, Mapping, MappingDirection,
    ProcessElement, ProcessModel, ServiceTask, SubProcess, SubProcessCall, TaskDefinition,
    TaskKind, UserTask, Walk,
};
pub use resolve::{
    ResolutionContext, ResolutionError, ResolutionErrors, ResolvedType, StaticResolutionContext,
    normalize_type_name, resolve, type_references, validate_types,
};
pub use views::{ProcessAssetDescriptor, ProcessVariable, ProcessViews, ServiceTaskEntry};
