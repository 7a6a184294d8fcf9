use crate::ValidationError;
use chrono::{DateTime, Utc};
use rulebook_types::{ArtifactId, ArtifactKind, NamespaceId, Status, Version};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind-specific, editable payload of a versioned artifact.
///
/// Everything else about a version (status, version number, audit stamps)
/// lives in [`Artifact`] and is owned by the lifecycle, not the caller.
pub trait ArtifactSpec:
    Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// Which artifact kind this payload describes.
    const KIND: ArtifactKind;

    /// Structural validation. Must not consult other artifacts.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Recomputes derived fields. Called before every write.
    fn normalize(&mut self) {}
}

/// One version of a versioned artifact (function, rule or workflow).
///
/// At most one version per `(namespace, artifact_id)` is `Active`, and
/// version numbers are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact<S> {
    pub namespace: NamespaceId,
    pub artifact_id: ArtifactId,
    pub version: Version,
    pub status: Status,
    #[serde(flatten)]
    pub spec: S,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl<S: ArtifactSpec> Artifact<S> {
    /// Builds a new draft version stamped with the current time.
    pub fn draft(
        namespace: NamespaceId,
        artifact_id: ArtifactId,
        version: Version,
        spec: S,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            artifact_id,
            version,
            status: Status::Draft,
            spec,
            created_by: created_by.into(),
            created_at: Utc::now(),
            published_by: None,
            published_at: None,
        }
    }

    /// The artifact kind, taken from the spec type.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        S::KIND
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status == Status::Draft
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Validates the envelope and the spec.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.created_by.trim().is_empty() {
            return Err(ValidationError::MissingCreator);
        }
        self.spec.validate()
    }
}
