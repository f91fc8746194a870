//! Semantic model builder.
//!
//! Walks an [`ElementTree`] once, in pre-order, classifying elements into
//! [`ProcessElement`] variants and recording the model indexes as it goes.
//!
//! ## Phases
//!
//! ```text
//! definitions children   → item definitions, interface operations
//!     │
//!     ▼
//! process children       → elements + indexes (scope stack for subprocesses)
//!     │
//!     ▼
//! boundary attachments   → every attachedToRef must name a known element
//! ```

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::errors::BuildError;
use super::model::{
    Association, BoundaryEvent, DataObject, DataTag, FormRef, Lane, Mapping, MappingDirection,
    ProcessElement, ProcessModel, ServiceTask, SubProcess, SubProcessCall, TaskDefinition,
    TaskKind, UserTask,
};
use crate::base::constants::{DEFAULT_FORM_SUFFIX, DEFAULT_VARIABLE_TYPE, task_inputs};
use crate::syntax::{ElementTree, XmlElement};

/// Options that change how a document is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Appended to a user task's name to form its default form name.
    pub form_suffix: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            form_suffix: DEFAULT_FORM_SUFFIX.to_string(),
        }
    }
}

/// Build a model with default options.
pub fn build_model(tree: &ElementTree, source: impl Into<Arc<str>>) -> Result<ProcessModel, BuildError> {
    ModelBuilder::new(BuildOptions::default()).build(tree, source)
}

/// An operation declared by a service interface.
#[derive(Debug, Clone)]
struct Operation {
    /// Implementation class of the owning interface.
    class: Option<String>,
    name: Option<String>,
}

/// A data input or output declared in a task's `ioSpecification`.
#[derive(Debug, Clone)]
struct DataItem {
    name: String,
    type_name: Option<String>,
}

/// Declared data items of one task, addressable by id or by name.
#[derive(Debug, Default)]
struct DataItems {
    inputs: Vec<(String, DataItem)>,
    outputs: Vec<(String, DataItem)>,
}

impl DataItems {
    fn find<'a>(items: &'a [(String, DataItem)], reference: &str) -> Option<&'a DataItem> {
        items
            .iter()
            .find(|(id, _)| id == reference)
            .or_else(|| items.iter().find(|(_, item)| item.name == reference))
            .map(|(_, item)| item)
    }
}

/// Mappings and reserved assignments read from one task element.
#[derive(Debug, Default)]
struct TaskData {
    inputs: Vec<Mapping>,
    outputs: Vec<Mapping>,
    /// Data input name → assigned literal, for inputs fed without a source.
    assignments: FxHashMap<String, String>,
}

impl TaskData {
    fn input_map(&self) -> IndexMap<String, String> {
        self.inputs
            .iter()
            .map(|m| (m.target.clone(), m.source.clone()))
            .collect()
    }

    fn output_map(&self) -> IndexMap<String, String> {
        self.outputs
            .iter()
            .map(|m| (m.target.clone(), m.source.clone()))
            .collect()
    }
}

/// Single-use builder turning an element tree into a [`ProcessModel`].
pub struct ModelBuilder {
    options: BuildOptions,
    /// Item definition id → structure type.
    item_definitions: FxHashMap<String, String>,
    /// Operation id → declared operation.
    operations: FxHashMap<String, Operation>,
    /// Ids of the enclosing subprocesses, innermost last.
    scopes: Vec<String>,
    /// Every element id seen in the process, for reference checks.
    known_ids: FxHashSet<String>,
    /// Boundary events awaiting their attachment check: (label, attached-to id).
    attachments: Vec<(String, String)>,
    tasks: IndexMap<String, TaskDefinition>,
    process_data: IndexMap<String, String>,
    forms: IndexSet<String>,
    reusable_subprocesses: IndexSet<String>,
    service_tasks: IndexMap<String, String>,
}

impl ModelBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            item_definitions: FxHashMap::default(),
            operations: FxHashMap::default(),
            scopes: Vec::new(),
            known_ids: FxHashSet::default(),
            attachments: Vec::new(),
            tasks: IndexMap::new(),
            process_data: IndexMap::new(),
            forms: IndexSet::new(),
            reusable_subprocesses: IndexSet::new(),
            service_tasks: IndexMap::new(),
        }
    }

    /// Build the model. The builder is consumed; any error aborts the build.
    pub fn build(
        mut self,
        tree: &ElementTree,
        source: impl Into<Arc<str>>,
    ) -> Result<ProcessModel, BuildError> {
        let root = &tree.root;
        let process = if root.name == "process" {
            root
        } else {
            self.collect_declarations(root);
            root.child("process").ok_or(BuildError::MissingProcess)?
        };

        let id = process
            .non_empty_attr("id")
            .ok_or_else(|| BuildError::missing_attribute("process", "id"))?
            .to_string();

        let elements = self.visit_scope(&process.children)?;
        self.check_attachments()?;

        debug!(
            process = %id,
            elements = elements.len(),
            tasks = self.tasks.len(),
            forms = self.forms.len(),
            "built process model"
        );

        Ok(ProcessModel {
            id,
            name: process.non_empty_attr("name").map(str::to_string),
            package_name: process.non_empty_attr("packageName").map(str::to_string),
            version: process.non_empty_attr("version").map(str::to_string),
            elements,
            source: source.into(),
            tasks: self.tasks,
            process_data: self.process_data,
            forms: self.forms,
            reusable_subprocesses: self.reusable_subprocesses,
            service_tasks: self.service_tasks,
        })
    }

    // ── Declarations ────────────────────────────────────────────────

    fn collect_declarations(&mut self, definitions: &XmlElement) {
        for child in &definitions.children {
            match child.name.as_str() {
                "itemDefinition" => {
                    if let (Some(id), Some(structure)) =
                        (child.non_empty_attr("id"), child.non_empty_attr("structureRef"))
                    {
                        self.item_definitions
                            .insert(id.to_string(), structure.to_string());
                    }
                }
                "interface" => {
                    let class = child
                        .non_empty_attr("implementationRef")
                        .or_else(|| child.non_empty_attr("name"))
                        .map(str::to_string);
                    for op in child.children_named("operation") {
                        let Some(op_id) = op.non_empty_attr("id") else {
                            continue;
                        };
                        let name = op
                            .non_empty_attr("implementationRef")
                            .or_else(|| op.non_empty_attr("name"))
                            .map(str::to_string);
                        self.operations.insert(
                            op_id.to_string(),
                            Operation {
                                class: class.clone(),
                                name,
                            },
                        );
                    }
                }
                _ => {}
            }
        }
    }

    // ── Traversal ───────────────────────────────────────────────────

    fn visit_scope(&mut self, children: &[XmlElement]) -> Result<Vec<ProcessElement>, BuildError> {
        let mut out = Vec::new();
        for child in children {
            self.visit(child, &mut out)?;
        }
        Ok(out)
    }

    fn visit(&mut self, e: &XmlElement, out: &mut Vec<ProcessElement>) -> Result<(), BuildError> {
        if let Some(id) = e.non_empty_attr("id") {
            self.known_ids.insert(id.to_string());
        }
        trace!(element = %e.name, depth = self.scopes.len(), "visit");

        match e.name.as_str() {
            "userTask" => out.push(ProcessElement::UserTask(self.user_task(e)?)),
            "serviceTask" => out.push(ProcessElement::ServiceTask(self.service_task(e)?)),
            "callActivity" => out.push(ProcessElement::SubProcessCall(self.call_activity(e)?)),
            "dataObject" | "property" => out.push(ProcessElement::DataObject(self.data_object(e)?)),
            "association" => out.push(ProcessElement::Association(association(e)?)),
            "formRef" => {
                let name = e
                    .non_empty_attr("name")
                    .ok_or_else(|| BuildError::missing_attribute(label(e), "name"))?
                    .to_string();
                self.forms.insert(name.clone());
                out.push(ProcessElement::FormRef(FormRef { name }));
            }
            "laneSet" | "childLaneSet" => {
                for child in &e.children {
                    self.visit(child, out)?;
                }
            }
            "lane" => {
                out.push(ProcessElement::Lane(lane(e)));
                for nested in e.children_named("childLaneSet") {
                    self.visit(nested, out)?;
                }
            }
            "boundaryEvent" => out.push(ProcessElement::BoundaryEvent(self.boundary_event(e)?)),
            "subProcess" | "adHocSubProcess" | "transaction" => {
                out.push(ProcessElement::SubProcess(self.subprocess(e)?));
            }
            // Flow nodes without metadata (events, gateways, flows, ...)
            _ => {}
        }
        Ok(())
    }

    fn subprocess(&mut self, e: &XmlElement) -> Result<SubProcess, BuildError> {
        let id = e
            .non_empty_attr("id")
            .ok_or_else(|| BuildError::missing_attribute(e.name.clone(), "id"))?
            .to_string();

        self.scopes.push(id.clone());
        let elements = self.visit_scope(&e.children);
        self.scopes.pop();

        Ok(SubProcess {
            id,
            name: e.non_empty_attr("name").map(str::to_string),
            elements: elements?,
        })
    }

    // ── Tasks ───────────────────────────────────────────────────────

    fn user_task(&mut self, e: &XmlElement) -> Result<UserTask, BuildError> {
        let id = e.attr("id").unwrap_or_default().to_string();
        let io = self.io_specification(e);

        // The name is needed to label mappings, but may itself be an assignment
        let assigned_name = assignment_values(e, &io)?
            .remove(task_inputs::TASK_NAME);
        let name = e
            .non_empty_attr("name")
            .map(str::to_string)
            .or(assigned_name)
            .or_else(|| (!id.is_empty()).then(|| id.clone()))
            .ok_or_else(|| BuildError::missing_attribute("userTask", "name"))?;

        let data = task_data(e, &name, &io)?;
        let el = label(e);
        let setting = |attr: &str, input: &str| {
            e.non_empty_attr(attr)
                .map(str::to_string)
                .or_else(|| data.assignments.get(input).cloned())
        };

        let priority = match setting("priority", task_inputs::PRIORITY) {
            Some(value) => value
                .trim()
                .parse::<i32>()
                .map_err(|_| BuildError::invalid_attribute(el.clone(), "priority", value.clone()))?,
            None => 0,
        };
        let skippable = match setting("skippable", task_inputs::SKIPPABLE) {
            Some(value) => parse_bool(&el, "skippable", &value)?,
            None => true,
        };
        let comment = setting("comment", task_inputs::COMMENT);

        let mut actors: Vec<String> = setting("actorId", task_inputs::ACTOR_ID)
            .as_deref()
            .map(split_list)
            .unwrap_or_default();
        for owner in e.children_named("potentialOwner") {
            if let Some(expr) = owner.find_descendant("formalExpression") {
                actors.extend(split_list(&expr.text));
            }
        }
        let groups = setting("groupId", task_inputs::GROUP_ID)
            .as_deref()
            .map(split_list)
            .unwrap_or_default();

        let form = e
            .non_empty_attr("formName")
            .or_else(|| e.child("formRef").and_then(|f| f.non_empty_attr("name")))
            .map(str::to_string);
        let effective_form = form
            .clone()
            .unwrap_or_else(|| format!("{name}{}", self.options.form_suffix));
        let listeners = e
            .children_named("listener")
            .filter_map(|l| l.non_empty_attr("class"))
            .map(str::to_string)
            .collect();

        self.register_task(TaskDefinition {
            name: name.clone(),
            kind: TaskKind::User,
            priority,
            comment: comment.clone(),
            skippable,
            form_name: Some(effective_form.clone()),
            input_mappings: data.input_map(),
            output_mappings: data.output_map(),
        })?;
        self.forms.insert(effective_form);

        Ok(UserTask {
            id,
            name,
            priority,
            skippable,
            comment,
            actors,
            groups,
            form,
            listeners,
            inputs: data.inputs,
            outputs: data.outputs,
        })
    }

    fn service_task(&mut self, e: &XmlElement) -> Result<ServiceTask, BuildError> {
        let id = e.attr("id").unwrap_or_default().to_string();
        let name = e
            .non_empty_attr("name")
            .map(str::to_string)
            .or_else(|| (!id.is_empty()).then(|| id.clone()))
            .ok_or_else(|| BuildError::missing_attribute("serviceTask", "name"))?;

        let (implementation, operation) = match e.non_empty_attr("operationRef") {
            Some(op_ref) => {
                let op = self
                    .operations
                    .get(op_ref)
                    .ok_or_else(|| BuildError::unresolved(label(e), op_ref))?;
                (op.class.clone(), op.name.clone())
            }
            None => (
                e.non_empty_attr("implementation")
                    .filter(|v| !v.starts_with("##"))
                    .map(str::to_string),
                e.non_empty_attr("operation").map(str::to_string),
            ),
        };

        let io = self.io_specification(e);
        let data = task_data(e, &name, &io)?;

        self.register_task(TaskDefinition {
            name: name.clone(),
            kind: TaskKind::Service,
            priority: 0,
            comment: None,
            skippable: false,
            form_name: None,
            input_mappings: data.input_map(),
            output_mappings: data.output_map(),
        })?;
        if let Some(class) = &implementation {
            self.service_tasks.insert(name.clone(), class.clone());
        }

        Ok(ServiceTask {
            id,
            name,
            implementation,
            operation,
            inputs: data.inputs,
            outputs: data.outputs,
        })
    }

    fn register_task(&mut self, def: TaskDefinition) -> Result<(), BuildError> {
        if let Some(existing) = self.tasks.get(&def.name) {
            return Err(if existing.kind != def.kind {
                BuildError::ConflictingTaskKind {
                    name: def.name,
                    first: existing.kind,
                    second: def.kind,
                }
            } else {
                BuildError::DuplicateTaskDefinition { name: def.name }
            });
        }
        trace!(task = %def.name, kind = %def.kind, "registered task");
        self.tasks.insert(def.name.clone(), def);
        Ok(())
    }

    fn io_specification(&self, e: &XmlElement) -> DataItems {
        let mut items = DataItems::default();
        let Some(io) = e.child("ioSpecification") else {
            return items;
        };
        let declare = |d: &XmlElement| {
            let name = d.non_empty_attr("name").or_else(|| d.non_empty_attr("id"))?;
            let id = d.non_empty_attr("id").unwrap_or(name);
            Some((
                id.to_string(),
                DataItem {
                    name: name.to_string(),
                    type_name: self.declared_type(d),
                },
            ))
        };
        items.inputs = io.children_named("dataInput").filter_map(declare).collect();
        items.outputs = io.children_named("dataOutput").filter_map(declare).collect();
        items
    }

    /// Type named by `dtype`, else by `itemSubjectRef` through item definitions.
    fn declared_type(&self, e: &XmlElement) -> Option<String> {
        e.non_empty_attr("dtype").map(str::to_string).or_else(|| {
            e.non_empty_attr("itemSubjectRef").map(|item| {
                self.item_definitions
                    .get(item)
                    .cloned()
                    .unwrap_or_else(|| item.to_string())
            })
        })
    }

    // ── Data, calls, events ─────────────────────────────────────────

    fn data_object(&mut self, e: &XmlElement) -> Result<DataObject, BuildError> {
        let id = e
            .non_empty_attr("id")
            .or_else(|| e.non_empty_attr("name"))
            .ok_or_else(|| BuildError::missing_attribute(e.name.clone(), "id"))?
            .to_string();
        let name = e.non_empty_attr("name").unwrap_or(id.as_str()).to_string();
        let type_name = self.declared_type(e);
        let tag = match e.non_empty_attr("entityKind") {
            Some(kind) => DataTag::Entity {
                kind: kind.to_string(),
            },
            None => DataTag::Variable,
        };

        self.process_data
            .entry(name.clone())
            .or_insert_with(|| type_name.clone().unwrap_or_else(|| DEFAULT_VARIABLE_TYPE.to_string()));

        Ok(DataObject {
            id,
            name,
            type_name,
            tag,
        })
    }

    fn call_activity(&mut self, e: &XmlElement) -> Result<SubProcessCall, BuildError> {
        let el = label(e);
        let called_element = e
            .non_empty_attr("calledElement")
            .ok_or_else(|| BuildError::missing_attribute(el.clone(), "calledElement"))?
            .to_string();
        let independent = bool_attr(e, &el, "independent", true)?;
        let wait_for_completion = bool_attr(e, &el, "waitForCompletion", true)?;

        self.reusable_subprocesses.insert(called_element.clone());

        Ok(SubProcessCall {
            id: e.attr("id").unwrap_or_default().to_string(),
            name: e.non_empty_attr("name").map(str::to_string),
            called_element,
            independent,
            wait_for_completion,
        })
    }

    fn boundary_event(&mut self, e: &XmlElement) -> Result<BoundaryEvent, BuildError> {
        let id = e
            .non_empty_attr("id")
            .ok_or_else(|| BuildError::missing_attribute("boundaryEvent", "id"))?
            .to_string();
        let el = label(e);
        let attached_to = e
            .non_empty_attr("attachedToRef")
            .map(str::to_string)
            .or_else(|| self.scopes.last().cloned())
            .ok_or_else(|| BuildError::missing_attribute(el.clone(), "attachedToRef"))?;
        let kind = e
            .children
            .iter()
            .find_map(|c| c.name.strip_suffix("EventDefinition"))
            .unwrap_or("none")
            .to_string();
        let cancel_activity = bool_attr(e, &el, "cancelActivity", true)?;

        self.attachments.push((el, attached_to.clone()));

        Ok(BoundaryEvent {
            id,
            name: e.non_empty_attr("name").map(str::to_string),
            attached_to,
            kind,
            cancel_activity,
        })
    }

    fn check_attachments(&self) -> Result<(), BuildError> {
        for (el, target) in &self.attachments {
            if !self.known_ids.contains(target) {
                return Err(BuildError::unresolved(el.clone(), target.clone()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// ELEMENT HELPERS
// ============================================================================

/// Read a task's data associations into mappings and assignments.
fn task_data(e: &XmlElement, task: &str, io: &DataItems) -> Result<TaskData, BuildError> {
    let mut data = TaskData {
        assignments: assignment_values(e, io)?,
        ..TaskData::default()
    };
    let mut seen_inputs = FxHashSet::default();
    let mut seen_outputs = FxHashSet::default();

    for assoc in e.children_named("dataInputAssociation") {
        let Some(source) = assoc.child_text("sourceRef") else {
            continue;
        };
        let item = input_item(e, task, assoc, io)?;
        if !seen_inputs.insert(item.name.clone()) {
            return Err(BuildError::DuplicateMapping {
                task: task.to_string(),
                direction: MappingDirection::Input,
                target: item.name.clone(),
            });
        }
        data.inputs.push(Mapping {
            task: task.to_string(),
            direction: MappingDirection::Input,
            source: source.to_string(),
            target: item.name.clone(),
            type_name: item.type_name.clone(),
        });
    }

    for assoc in e.children_named("dataOutputAssociation") {
        let source_ref = assoc
            .child_text("sourceRef")
            .ok_or_else(|| BuildError::missing_attribute(label(e), "sourceRef"))?;
        let item = DataItems::find(&io.outputs, source_ref).ok_or_else(|| {
            BuildError::DanglingMapping {
                task: task.to_string(),
                reference: source_ref.to_string(),
            }
        })?;
        // Outputs written through a transformation have no plain target
        let Some(target) = assoc.child_text("targetRef") else {
            continue;
        };
        if !seen_outputs.insert(target.to_string()) {
            return Err(BuildError::DuplicateMapping {
                task: task.to_string(),
                direction: MappingDirection::Output,
                target: target.to_string(),
            });
        }
        data.outputs.push(Mapping {
            task: task.to_string(),
            direction: MappingDirection::Output,
            source: item.name.clone(),
            target: target.to_string(),
            type_name: item.type_name.clone(),
        });
    }

    Ok(data)
}

/// Literal values assigned to data inputs that have no source variable.
fn assignment_values(e: &XmlElement, io: &DataItems) -> Result<FxHashMap<String, String>, BuildError> {
    let task = e.non_empty_attr("name").unwrap_or_else(|| e.attr("id").unwrap_or_default());
    let mut values = FxHashMap::default();
    for assoc in e.children_named("dataInputAssociation") {
        if assoc.child_text("sourceRef").is_some() {
            continue;
        }
        let item = input_item(e, task, assoc, io)?;
        let value = assoc
            .child("assignment")
            .and_then(|a| a.child("from"))
            .map(|from| from.text.clone())
            .filter(|v| !v.is_empty());
        if let Some(value) = value {
            values.insert(item.name.clone(), value);
        }
    }
    Ok(values)
}

fn input_item<'a>(
    e: &XmlElement,
    task: &str,
    assoc: &XmlElement,
    io: &'a DataItems,
) -> Result<&'a DataItem, BuildError> {
    let target_ref = assoc
        .child_text("targetRef")
        .ok_or_else(|| BuildError::missing_attribute(label(e), "targetRef"))?;
    DataItems::find(&io.inputs, target_ref).ok_or_else(|| BuildError::DanglingMapping {
        task: task.to_string(),
        reference: target_ref.to_string(),
    })
}

fn association(e: &XmlElement) -> Result<Association, BuildError> {
    let endpoint = |name: &'static str| {
        e.non_empty_attr(name)
            .or_else(|| e.child_text(name))
            .map(str::to_string)
            .ok_or_else(|| BuildError::missing_attribute(label(e), name))
    };
    Ok(Association {
        id: e.non_empty_attr("id").map(str::to_string),
        source_ref: endpoint("sourceRef")?,
        target_ref: endpoint("targetRef")?,
    })
}

fn lane(e: &XmlElement) -> Lane {
    let id = e.non_empty_attr("id").map(str::to_string);
    Lane {
        name: e
            .non_empty_attr("name")
            .map(str::to_string)
            .or_else(|| id.clone())
            .unwrap_or_default(),
        id,
        flow_node_refs: e
            .children_named("flowNodeRef")
            .map(|r| r.text.clone())
            .filter(|r| !r.is_empty())
            .collect(),
    }
}

/// Identity of an element for error messages, e.g. `userTask#_12`.
fn label(e: &XmlElement) -> String {
    match e.non_empty_attr("id") {
        Some(id) => format!("{}#{id}", e.name),
        None => e.name.clone(),
    }
}

fn bool_attr(
    e: &XmlElement,
    el: &str,
    attribute: &'static str,
    default: bool,
) -> Result<bool, BuildError> {
    match e.non_empty_attr(attribute) {
        Some(value) => parse_bool(el, attribute, value),
        None => Ok(default),
    }
}

fn parse_bool(el: &str, attribute: &'static str, value: &str) -> Result<bool, BuildError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(BuildError::invalid_attribute(el, attribute, value)),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
