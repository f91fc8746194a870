//! Domain constants shared by the builder and the projector.

/// Type recorded for process variables that declare no type.
pub const DEFAULT_VARIABLE_TYPE: &str = "java.lang.Object";

/// Suffix appended to a task name to form its conventional default form.
pub const DEFAULT_FORM_SUFFIX: &str = "-taskform";

/// Knowledge-base identifier used when no deployment unit is named.
pub const DEFAULT_DEPLOYMENT_ID: &str = "default";

/// Reserved human-task data inputs carrying task metadata as assignments.
pub mod task_inputs {
    pub const TASK_NAME: &str = "TaskName";
    pub const PRIORITY: &str = "Priority";
    pub const COMMENT: &str = "Comment";
    pub const SKIPPABLE: &str = "Skippable";
    pub const ACTOR_ID: &str = "ActorId";
    pub const GROUP_ID: &str = "GroupId";
}

/// Java primitive type names; these resolve without a resolution context.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];
