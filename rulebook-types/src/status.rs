use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of one version of a versioned artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Editable, not yet live.
    Draft,
    /// The single live version, read by downstream consumers.
    Active,
    /// A formerly active version that has been superseded or deactivated.
    Inactive,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

/// The kinds of artifact scoped to a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Field,
    Function,
    Rule,
    Workflow,
    Terminal,
}

impl ArtifactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Field => "field",
            ArtifactKind::Function => "function",
            ArtifactKind::Rule => "rule",
            ArtifactKind::Workflow => "workflow",
            ArtifactKind::Terminal => "terminal",
        }
    }

    /// Whether artifacts of this kind go through the draft/active lifecycle.
    #[must_use]
    pub const fn is_versioned(self) -> bool {
        matches!(
            self,
            ArtifactKind::Function | ArtifactKind::Rule | ArtifactKind::Workflow
        )
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "field" => Ok(ArtifactKind::Field),
            "function" => Ok(ArtifactKind::Function),
            "rule" => Ok(ArtifactKind::Rule),
            "workflow" => Ok(ArtifactKind::Workflow),
            "terminal" => Ok(ArtifactKind::Terminal),
            other => Err(Error::InvalidKind(other.to_string())),
        }
    }
}
