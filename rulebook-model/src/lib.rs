//! Artifact model for Rulebook.
//!
//! Defines the configuration artifacts every other subsystem reads and writes:
//! - [`Namespace`]: the tenant boundary all artifacts are scoped to
//! - [`Field`] and [`Terminal`]: unversioned, usable as soon as they exist
//! - [`Artifact`]: the versioned draft/active/inactive envelope, specialised
//!   by an [`ArtifactSpec`] into [`Function`], [`Rule`] and [`Workflow`]
//! - [`Condition`]: the closed set of rule condition variants
//! - [`ActiveConfigMeta`]: the per-namespace change signal
//!
//! Structural validation lives next to each type and reports a
//! [`ValidationError`]. Checks that need to look at other artifacts
//! (does a referenced function exist, is it active) are not done here.

mod artifact;
mod condition;
mod error;
mod field;
mod function;
mod namespace;
mod rule;
mod signal;
mod terminal;
mod workflow;

pub use artifact::{Artifact, ArtifactSpec};
pub use condition::{parse_conditions, Condition, Operator};
pub use error::{ConditionError, ValidationError, WorkflowError};
pub use field::{Field, FieldType};
pub use function::{FunctionSpec, FunctionType, ReturnType};
pub use namespace::{Namespace, MAX_DESCRIPTION_LEN};
pub use rule::{Logic, RuleSpec};
pub use signal::ActiveConfigMeta;
pub use terminal::Terminal;
pub use workflow::{WorkflowSpec, WorkflowStep};

/// A versioned function artifact.
pub type Function = Artifact<FunctionSpec>;

/// A versioned rule artifact.
pub type Rule = Artifact<RuleSpec>;

/// A versioned workflow artifact.
pub type Workflow = Artifact<WorkflowSpec>;
