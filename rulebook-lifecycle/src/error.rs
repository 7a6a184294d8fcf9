//! Error types for the lifecycle layer.

use rulebook_model::ValidationError;
use rulebook_storage::StoreError;
use rulebook_types::{ArtifactId, ArtifactKind, NamespaceId, Version};
use std::fmt;
use thiserror::Error;

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a failed dependency check.
    Validation,
    /// A namespace, artifact or version is absent.
    NotFound,
    /// A draft or active version already exists.
    AlreadyExists,
    /// A referenced function or rule exists but has no active version.
    NotActive,
    /// Unexpected persistence failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::NotActive => "not active",
            ErrorKind::Internal => "internal",
        })
    }
}

/// A publish-time reference check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("field not found: {0}")]
    FieldNotFound(ArtifactId),

    #[error("function not found: {0}")]
    FunctionNotFound(ArtifactId),

    #[error("function is not active: {0}")]
    FunctionNotActive(ArtifactId),

    #[error("rule not found: {0}")]
    RuleNotFound(ArtifactId),

    #[error("rule is not active: {0}")]
    RuleNotActive(ArtifactId),

    #[error("terminal not found: {0}")]
    TerminalNotFound(ArtifactId),

    /// Publishing would make the rule depend on itself. The path starts and
    /// ends with the rule being published.
    #[error("rule reference cycle: {}", display_path(.0))]
    RuleCycle(Vec<ArtifactId>),
}

fn display_path(path: &[ArtifactId]) -> String {
    path.iter()
        .map(ArtifactId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl DependencyError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DependencyError::FieldNotFound(_)
            | DependencyError::FunctionNotFound(_)
            | DependencyError::RuleNotFound(_)
            | DependencyError::TerminalNotFound(_) => ErrorKind::NotFound,
            DependencyError::FunctionNotActive(_) | DependencyError::RuleNotActive(_) => {
                ErrorKind::NotActive
            }
            DependencyError::RuleCycle(_) => ErrorKind::Validation,
        }
    }
}

/// Errors returned by lifecycle, registry, catalog and signal operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is structurally invalid.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A reference to another artifact did not resolve to a live one.
    #[error("dependency check failed: {0}")]
    Dependency(#[from] DependencyError),

    /// The named thing does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The named thing already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Persistence failed before this operation changed any row.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Publish retired the previous active version but could not activate
    /// the draft. The artifact has no active version; the change signal was
    /// refreshed to match.
    #[error("{kind} {namespace}/{artifact_id}: v{retired} was retired but v{version} was not activated: {source}")]
    ActivationFailed {
        kind: ArtifactKind,
        namespace: NamespaceId,
        artifact_id: ArtifactId,
        retired: Version,
        version: Version,
        source: Box<Error>,
    },

    /// The artifact change committed, but refreshing the namespace's change
    /// signal afterwards failed.
    #[error("{kind} {namespace}/{artifact_id} v{version} was committed but the change signal was not refreshed: {source}")]
    SignalRefresh {
        kind: ArtifactKind,
        namespace: NamespaceId,
        artifact_id: ArtifactId,
        version: Version,
        source: StoreError,
    },
}

impl From<rulebook_types::Error> for Error {
    fn from(e: rulebook_types::Error) -> Self {
        Error::Validation(ValidationError::Id(e))
    }
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Dependency(d) => d.kind(),
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::Store(_) | Error::ActivationFailed { .. } | Error::SignalRefresh { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the operation's state change is known to have committed
    /// despite the error.
    #[must_use]
    pub fn committed(&self) -> bool {
        matches!(
            self,
            Error::ActivationFailed { .. } | Error::SignalRefresh { .. }
        )
    }
}
