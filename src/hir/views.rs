//! Metadata projections over a built [`ProcessModel`].
//!
//! Every query the service answers is one pure function here. [`ProcessViews`]
//! runs all of them once per cache entry so that reads only clone.

use indexmap::{IndexMap, IndexSet};

use super::model::{DataTag, MappingDirection, ProcessElement, ProcessModel, TaskDefinition};

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// A process variable and its declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessVariable {
    pub name: String,
    pub type_name: String,
}

/// A service task and the class implementing it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceTaskEntry {
    pub task_name: String,
    pub implementation: String,
}

/// Summary of one process definition as deployed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessAssetDescriptor {
    pub id: String,
    pub name: Option<String>,
    pub package: Option<String>,
    pub version: Option<String>,
    /// Knowledge base (deployment unit) the process belongs to.
    pub deployment_id: String,
    pub forms: Vec<String>,
    pub variables: Vec<ProcessVariable>,
    pub reusable_subprocesses: Vec<String>,
    pub service_tasks: Vec<ServiceTaskEntry>,
    /// Entity name → entity kind.
    pub entities: IndexMap<String, String>,
    pub domain_objects: Vec<String>,
    /// Task names in document order.
    pub tasks: Vec<String>,
}

#[cfg(feature = "interchange")]
impl ProcessAssetDescriptor {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

// ============================================================================
// PROJECTIONS
// ============================================================================

/// Data objects tagged as entities: name → kind.
pub fn associated_entities(model: &ProcessModel) -> IndexMap<String, String> {
    let mut entities = IndexMap::new();
    for element in model.walk() {
        if let ProcessElement::DataObject(data) = element
            && let DataTag::Entity { kind } = &data.tag
        {
            entities.entry(data.name.clone()).or_insert_with(|| kind.clone());
        }
    }
    entities
}

/// Distinct type names referenced by data objects and mappings, first-seen order.
pub fn domain_objects(model: &ProcessModel) -> Vec<String> {
    let mut types = IndexSet::new();
    for element in model.walk() {
        if let ProcessElement::DataObject(data) = element
            && let Some(ty) = &data.type_name
        {
            types.insert(ty.clone());
        }
        for mapping in element.mappings() {
            if let Some(ty) = &mapping.type_name {
                types.insert(ty.clone());
            }
        }
    }
    types.into_iter().collect()
}

pub fn process_data(model: &ProcessModel) -> IndexMap<String, String> {
    model.process_data.clone()
}

pub fn associated_forms(model: &ProcessModel) -> Vec<String> {
    model.forms.iter().cloned().collect()
}

pub fn task_definitions(model: &ProcessModel) -> Vec<TaskDefinition> {
    model.tasks.values().cloned().collect()
}

pub fn reusable_subprocesses(model: &ProcessModel) -> IndexSet<String> {
    model.reusable_subprocesses.clone()
}

pub fn service_tasks(model: &ProcessModel) -> IndexMap<String, String> {
    model.service_tasks.clone()
}

/// Target → source mappings of one task in one direction. Empty for unknown tasks.
pub fn task_mappings(
    model: &ProcessModel,
    task: &str,
    direction: MappingDirection,
) -> IndexMap<String, String> {
    let Some(def) = model.task(task) else {
        return IndexMap::new();
    };
    match direction {
        MappingDirection::Input => def.input_mappings.clone(),
        MappingDirection::Output => def.output_mappings.clone(),
    }
}

pub fn task_input_mappings(model: &ProcessModel, task: &str) -> IndexMap<String, String> {
    task_mappings(model, task, MappingDirection::Input)
}

pub fn task_output_mappings(model: &ProcessModel, task: &str) -> IndexMap<String, String> {
    task_mappings(model, task, MappingDirection::Output)
}

/// Compose the descriptor from the individual projections.
pub fn descriptor(model: &ProcessModel, deployment_id: &str) -> ProcessAssetDescriptor {
    ProcessAssetDescriptor {
        id: model.id.clone(),
        name: model.name.clone(),
        package: model.package_name.clone(),
        version: model.version.clone(),
        deployment_id: deployment_id.to_string(),
        forms: associated_forms(model),
        variables: model
            .process_data
            .iter()
            .map(|(name, ty)| ProcessVariable {
                name: name.clone(),
                type_name: ty.clone(),
            })
            .collect(),
        reusable_subprocesses: model.reusable_subprocesses.iter().cloned().collect(),
        service_tasks: model
            .service_tasks
            .iter()
            .map(|(task, class)| ServiceTaskEntry {
                task_name: task.clone(),
                implementation: class.clone(),
            })
            .collect(),
        entities: associated_entities(model),
        domain_objects: domain_objects(model),
        tasks: model.tasks.keys().cloned().collect(),
    }
}

// ============================================================================
// PRECOMPUTED VIEWS
// ============================================================================

/// All projections of one model, computed once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessViews {
    pub entities: IndexMap<String, String>,
    pub domain_objects: Vec<String>,
    pub process_data: IndexMap<String, String>,
    pub forms: Vec<String>,
    pub task_definitions: Vec<TaskDefinition>,
    pub reusable_subprocesses: IndexSet<String>,
    pub service_tasks: IndexMap<String, String>,
    pub descriptor: ProcessAssetDescriptor,
}

impl ProcessViews {
    pub fn project(model: &ProcessModel, deployment_id: &str) -> Self {
        let descriptor = descriptor(model, deployment_id);
        Self {
            entities: descriptor.entities.clone(),
            domain_objects: descriptor.domain_objects.clone(),
            process_data: process_data(model),
            forms: descriptor.forms.clone(),
            task_definitions: task_definitions(model),
            reusable_subprocesses: reusable_subprocesses(model),
            service_tasks: service_tasks(model),
            descriptor,
        }
    }
}
