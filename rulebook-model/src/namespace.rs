use crate::ValidationError;
use chrono::{DateTime, Utc};
use rulebook_types::NamespaceId;
use serde::{Deserialize, Serialize};

/// Longest accepted namespace description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A tenant boundary. Every other artifact belongs to exactly one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub id: NamespaceId,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Namespace {
    pub fn new(
        id: NamespaceId,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.created_by.trim().is_empty() {
            return Err(ValidationError::MissingCreator);
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LEN,
            });
        }
        Ok(())
    }
}
