//! Semantic model of one process definition.
//!
//! The model stores the element graph in document order together with the
//! indexes the builder records while walking it:
//!
//! ```text
//! ProcessModel
//! ├── elements: Vec<ProcessElement>              (pre-order, nested scopes inline)
//! ├── tasks: IndexMap<name, TaskDefinition>      (unique names)
//! ├── process_data: IndexMap<name, type>
//! ├── forms: IndexSet<form>                      (first-seen order)
//! ├── reusable_subprocesses: IndexSet<process id>
//! └── service_tasks: IndexMap<task name, implementation class>
//! ```
//!
//! A model is immutable once built. Rebuilding produces a new instance.

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

// ============================================================================
// MAPPINGS
// ============================================================================

/// Direction of a task data mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "lowercase"))]
pub enum MappingDirection {
    Input,
    Output,
}

impl std::fmt::Display for MappingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// A data-flow binding between a task's local data and process data.
///
/// For inputs the target is the task's data input and the source a process
/// variable; for outputs the source is the task's data output and the
/// target a process variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    /// Name of the owning task.
    pub task: String,
    pub direction: MappingDirection,
    pub source: String,
    pub target: String,
    /// Declared type of the task-side data item, if any.
    pub type_name: Option<String>,
}

// ============================================================================
// ELEMENTS
// ============================================================================

/// The kind of a named task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "lowercase"))]
pub enum TaskKind {
    User,
    Service,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user task"),
            Self::Service => write!(f, "service task"),
        }
    }
}

/// A human task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserTask {
    pub id: String,
    pub name: String,
    pub priority: i32,
    pub skippable: bool,
    pub comment: Option<String>,
    /// Actor assignment expressions.
    pub actors: Vec<String>,
    /// Group assignment expressions.
    pub groups: Vec<String>,
    /// Form named explicitly in the document.
    pub form: Option<String>,
    /// Task listener class names.
    pub listeners: Vec<String>,
    pub inputs: Vec<Mapping>,
    pub outputs: Vec<Mapping>,
}

/// An automated task backed by an implementation class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceTask {
    pub id: String,
    pub name: String,
    pub implementation: Option<String>,
    pub operation: Option<String>,
    pub inputs: Vec<Mapping>,
    pub outputs: Vec<Mapping>,
}

/// A call to another, separately deployed process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubProcessCall {
    pub id: String,
    pub name: Option<String>,
    /// Id of the called process. Never resolved by the builder.
    pub called_element: String,
    pub independent: bool,
    pub wait_for_completion: bool,
}

/// Whether a data object is a plain variable or a persistent entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataTag {
    Variable,
    Entity { kind: String },
}

/// A process variable or data object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataObject {
    pub id: String,
    pub name: String,
    /// Type named in the document; `None` when untyped.
    pub type_name: Option<String>,
    pub tag: DataTag,
}

impl DataObject {
    pub fn is_entity(&self) -> bool {
        matches!(self.tag, DataTag::Entity { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Association {
    pub id: Option<String>,
    pub source_ref: String,
    pub target_ref: String,
}

/// A form referenced at process level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormRef {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    pub id: Option<String>,
    pub name: String,
    pub flow_node_refs: Vec<String>,
}

/// An event attached to the boundary of a task or subprocess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryEvent {
    pub id: String,
    pub name: Option<String>,
    /// Id of the activity the event is attached to.
    pub attached_to: String,
    /// Event definition kind (`error`, `timer`, ...), `none` when absent.
    pub kind: String,
    pub cancel_activity: bool,
}

/// An embedded subprocess scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubProcess {
    pub id: String,
    pub name: Option<String>,
    pub elements: Vec<ProcessElement>,
}

/// A classified process construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessElement {
    UserTask(UserTask),
    ServiceTask(ServiceTask),
    SubProcessCall(SubProcessCall),
    DataObject(DataObject),
    Association(Association),
    FormRef(FormRef),
    Lane(Lane),
    BoundaryEvent(BoundaryEvent),
    SubProcess(SubProcess),
}

impl ProcessElement {
    /// The element's document id, where it has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::UserTask(t) => Some(&t.id),
            Self::ServiceTask(t) => Some(&t.id),
            Self::SubProcessCall(c) => Some(&c.id),
            Self::DataObject(d) => Some(&d.id),
            Self::Association(a) => a.id.as_deref(),
            Self::FormRef(_) => None,
            Self::Lane(l) => l.id.as_deref(),
            Self::BoundaryEvent(b) => Some(&b.id),
            Self::SubProcess(s) => Some(&s.id),
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UserTask(_) => "userTask",
            Self::ServiceTask(_) => "serviceTask",
            Self::SubProcessCall(_) => "callActivity",
            Self::DataObject(_) => "dataObject",
            Self::Association(_) => "association",
            Self::FormRef(_) => "formRef",
            Self::Lane(_) => "lane",
            Self::BoundaryEvent(_) => "boundaryEvent",
            Self::SubProcess(_) => "subProcess",
        }
    }

    /// Mappings owned by this element (tasks only).
    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        let (inputs, outputs): (&[Mapping], &[Mapping]) = match self {
            Self::UserTask(t) => (&t.inputs, &t.outputs),
            Self::ServiceTask(t) => (&t.inputs, &t.outputs),
            _ => (&[], &[]),
        };
        inputs.iter().chain(outputs.iter())
    }
}

// ============================================================================
// TASK DEFINITIONS
// ============================================================================

/// Metadata for one named task. Names are unique within a model.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskDefinition {
    pub name: String,
    pub kind: TaskKind,
    pub priority: i32,
    pub comment: Option<String>,
    pub skippable: bool,
    /// Effective form: explicit or conventional default. Service tasks have none.
    pub form_name: Option<String>,
    /// Data input name → process expression.
    pub input_mappings: IndexMap<String, String>,
    /// Process variable → data output name.
    pub output_mappings: IndexMap<String, String>,
}

// ============================================================================
// PROCESS MODEL
// ============================================================================

/// The built semantic model of one process definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessModel {
    pub id: String,
    pub name: Option<String>,
    pub package_name: Option<String>,
    pub version: Option<String>,
    /// Top-level elements in document order.
    pub elements: Vec<ProcessElement>,
    /// The document text the model was built from.
    pub source: Arc<str>,
    pub tasks: IndexMap<String, TaskDefinition>,
    pub process_data: IndexMap<String, String>,
    pub forms: IndexSet<String>,
    pub reusable_subprocesses: IndexSet<String>,
    pub service_tasks: IndexMap<String, String>,
}

impl ProcessModel {
    /// Pre-order walk over every element, descending into subprocesses.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.elements.iter().rev().collect(),
        }
    }

    /// Look up a task definition by name.
    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.get(name)
    }

    /// All mappings in the model, in document order.
    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.walk().flat_map(ProcessElement::mappings)
    }

    /// Total number of elements, nested ones included.
    pub fn element_count(&self) -> usize {
        self.walk().count()
    }
}

/// Pre-order iterator over the elements of a [`ProcessModel`].
pub struct Walk<'a> {
    stack: Vec<&'a ProcessElement>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ProcessElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        if let ProcessElement::SubProcess(scope) = next {
            self.stack.extend(scope.elements.iter().rev());
        }
        Some(next)
    }
}
