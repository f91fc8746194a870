//! Type resolution against a caller-supplied context.
//!
//! Cheap metadata queries treat type names as opaque strings. Only the
//! strict path validates them: every explicit type reference in a model is
//! resolved through a [`ResolutionContext`], and failures are collected per
//! type name instead of stopping at the first one.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, trace};

use super::model::{ProcessElement, ProcessModel};
use crate::base::constants::PRIMITIVE_TYPES;

// ============================================================================
// CONTEXT
// ============================================================================

/// A type name resolved to something loadable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedType {
    /// Normalised type name.
    pub name: String,
    pub primitive: bool,
    /// Deployment unit the type was found in, when the context reports one.
    pub origin: Option<String>,
}

impl ResolvedType {
    pub fn new(name: impl Into<String>, origin: Option<String>) -> Self {
        Self {
            name: name.into(),
            primitive: false,
            origin,
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitive: true,
            origin: None,
        }
    }
}

/// Capability that turns a type name into a loadable type.
///
/// Implementations may be slow; they are called synchronously and the caller
/// owns any timeout policy.
pub trait ResolutionContext: Send + Sync {
    fn resolve_type(&self, name: &str) -> Option<ResolvedType>;

    /// Deployment unit this context is scoped to.
    fn deployment_id(&self) -> Option<&str> {
        None
    }
}

/// In-memory context over a fixed set of known type names.
#[derive(Clone, Debug, Default)]
pub struct StaticResolutionContext {
    deployment_id: Option<String>,
    types: FxHashSet<String>,
}

impl StaticResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployment(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.types.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ResolutionContext for StaticResolutionContext {
    fn resolve_type(&self, name: &str) -> Option<ResolvedType> {
        self.types
            .contains(name)
            .then(|| ResolvedType::new(name, self.deployment_id.clone()))
    }

    fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// One type name that could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("type `{type_name}` cannot be resolved: {reason}")]
pub struct ResolutionError {
    pub type_name: String,
    /// Labels of every element referencing the type.
    pub referenced_by: Vec<String>,
    pub reason: String,
}

impl ResolutionError {
    pub fn new(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            referenced_by: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn referenced_by(mut self, labels: Vec<String>) -> Self {
        self.referenced_by = labels;
        self
    }
}

/// Every resolution failure of one validation pass.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{} type reference(s) could not be resolved: {}", .errors.len(), type_list(.errors))]
pub struct ResolutionErrors {
    pub errors: Vec<ResolutionError>,
}

impl ResolutionErrors {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolutionError> {
        self.errors.iter()
    }

    /// Failing type names, in the order they were first referenced.
    pub fn type_names(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.type_name.as_str()).collect()
    }
}

fn type_list(errors: &[ResolutionError]) -> String {
    errors
        .iter()
        .map(|e| e.type_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Strip whitespace, generic arguments and array suffixes.
///
/// `java.util.List<org.acme.Item>` → `java.util.List`, `int[][]` → `int`.
pub fn normalize_type_name(name: &str) -> &str {
    let mut name = name.trim();
    if let Some(idx) = name.find('<') {
        name = name[..idx].trim_end();
    }
    while let Some(stripped) = name.strip_suffix("[]") {
        name = stripped.trim_end();
    }
    name
}

/// Resolve one type name. Primitives never consult the context.
pub fn resolve(type_name: &str, ctx: &dyn ResolutionContext) -> Result<ResolvedType, ResolutionError> {
    let name = normalize_type_name(type_name);
    if name.is_empty() {
        return Err(ResolutionError::new(type_name, "empty type name"));
    }
    if PRIMITIVE_TYPES.contains(&name) {
        return Ok(ResolvedType::primitive(name));
    }
    ctx.resolve_type(name).ok_or_else(|| {
        let reason = match ctx.deployment_id() {
            Some(deployment) => format!("not loadable in deployment `{deployment}`"),
            None => "not loadable in the resolution context".to_string(),
        };
        ResolutionError::new(name, reason)
    })
}

/// Explicit type references of a model: normalised name → referencing labels.
pub fn type_references(model: &ProcessModel) -> IndexMap<String, Vec<String>> {
    let mut refs: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut add = |ty: &str, label: String| {
        let name = normalize_type_name(ty);
        if name.is_empty() {
            return;
        }
        let labels = refs.entry(name.to_string()).or_default();
        if !labels.contains(&label) {
            labels.push(label);
        }
    };

    for element in model.walk() {
        let label = match element.id() {
            Some(id) if !id.is_empty() => format!("{}#{id}", element.kind_name()),
            _ => element.kind_name().to_string(),
        };
        match element {
            ProcessElement::DataObject(data) => {
                if let Some(ty) = &data.type_name {
                    add(ty, label.clone());
                }
            }
            ProcessElement::UserTask(task) => {
                for class in &task.listeners {
                    add(class, label.clone());
                }
            }
            ProcessElement::ServiceTask(task) => {
                if let Some(class) = &task.implementation {
                    add(class, label.clone());
                }
            }
            _ => {}
        }
        for mapping in element.mappings() {
            if let Some(ty) = &mapping.type_name {
                add(ty, label.clone());
            }
        }
    }
    refs
}

/// Resolve every explicit type reference in `model`.
///
/// Reports one [`ResolutionError`] per failing type name, listing every
/// element that references it.
pub fn validate_types(model: &ProcessModel, ctx: &dyn ResolutionContext) -> Result<(), ResolutionErrors> {
    let refs = type_references(model);
    let mut errors = Vec::new();

    for (name, labels) in refs.iter() {
        match resolve(name, ctx) {
            Ok(resolved) => trace!(type_name = %resolved.name, primitive = resolved.primitive, "resolved"),
            Err(err) => errors.push(err.referenced_by(labels.clone())),
        }
    }

    debug!(
        process = %model.id,
        checked = refs.len(),
        failed = errors.len(),
        "validated type references"
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ResolutionErrors { errors })
    }
}
