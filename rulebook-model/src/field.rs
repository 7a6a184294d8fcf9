use crate::ValidationError;
use chrono::{DateTime, Utc};
use rulebook_types::{ArtifactId, NamespaceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    String,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(FieldType::Number),
            "string" => Ok(FieldType::String),
            other => Err(ValidationError::InvalidFieldType(other.to_string())),
        }
    }
}

/// A typed input field. Unversioned: usable as soon as it exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub namespace: NamespaceId,
    pub field_id: ArtifactId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Field {
    pub fn new(
        namespace: NamespaceId,
        field_id: ArtifactId,
        field_type: FieldType,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            field_id,
            field_type,
            description: description.into(),
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
