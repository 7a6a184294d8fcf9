//! Structural validation errors.

use thiserror::Error;

/// Errors raised when an artifact is malformed on its own terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An identifier failed validation.
    #[error(transparent)]
    Id(#[from] rulebook_types::Error),

    /// The creator identity is blank.
    #[error("createdBy must not be blank")]
    MissingCreator,

    /// The publisher identity is blank.
    #[error("publishedBy must not be blank")]
    MissingPublisher,

    /// A description exceeds the allowed length.
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    /// Unknown field type.
    #[error("invalid field type: {0}")]
    InvalidFieldType(String),

    /// Unknown function type.
    #[error("invalid function type: {0}")]
    InvalidFunctionType(String),

    /// Function arguments do not match the function type.
    #[error("invalid arguments for {function_type} function: {reason}")]
    InvalidFunctionArgs {
        function_type: &'static str,
        reason: &'static str,
    },

    /// Rule logic is neither AND nor OR.
    #[error("invalid rule logic: {0}")]
    InvalidLogic(String),

    /// The rule condition list is malformed.
    #[error("invalid conditions: {0}")]
    Conditions(#[from] ConditionError),

    /// The workflow step graph is malformed.
    #[error("invalid workflow: {0}")]
    Workflow(#[from] WorkflowError),
}

/// Structural problems in a rule's condition list.
///
/// `index` is the zero-based position of the offending condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("conditions must be a list")]
    NotAList,

    #[error("conditions must not be empty")]
    Empty,

    #[error("condition {index} is not an object")]
    NotAnObject { index: usize },

    #[error("condition {index} has no type")]
    MissingType { index: usize },

    #[error("condition {index} has unknown type {found:?}")]
    UnknownType { index: usize, found: String },

    #[error("condition {index} is missing required field {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("condition {index} has invalid operator {operator:?}")]
    InvalidOperator { index: usize, operator: String },
}

/// Structural problems in a workflow's step graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("startAt must not be blank")]
    MissingStartAt,

    #[error("startAt names unknown step {0:?}")]
    UnknownStartStep(String),

    #[error("the {branch} path for step {step:?} points at unknown step {target:?}")]
    DanglingBranch {
        step: String,
        branch: &'static str,
        target: String,
    },

    #[error("cyclic dependency detected in workflow steps: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("malformed steps: {0}")]
    Malformed(String),
}
