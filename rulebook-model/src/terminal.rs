use crate::ValidationError;
use chrono::{DateTime, Utc};
use rulebook_types::{ArtifactId, NamespaceId};
use serde::{Deserialize, Serialize};

/// A workflow leaf outcome. Unversioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    pub namespace: NamespaceId,
    pub terminal_id: ArtifactId,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Terminal {
    pub fn new(
        namespace: NamespaceId,
        terminal_id: ArtifactId,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            terminal_id,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.created_by.trim().is_empty() {
            return Err(ValidationError::MissingCreator);
        }
        Ok(())
    }
}
