use crate::{parse_conditions, ArtifactSpec, Condition, ConditionError, ValidationError};
use rulebook_types::{ArtifactId, ArtifactKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How a rule combines its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logic {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        })
    }
}

impl FromStr for Logic {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Logic::And),
            "OR" => Ok(Logic::Or),
            other => Err(ValidationError::InvalidLogic(other.to_string())),
        }
    }
}

/// Payload of a rule version: a combinator over an ordered condition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub logic: Logic,
    pub conditions: Vec<Condition>,
}

impl RuleSpec {
    pub fn new(logic: Logic, conditions: Vec<Condition>) -> Self {
        Self { logic, conditions }
    }

    /// Builds a spec from untrusted JSON of the shape
    /// `{"logic": "AND", "conditions": [...]}`.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let logic = value
            .get("logic")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .parse::<Logic>()?;
        let conditions = value
            .get("conditions")
            .ok_or(ConditionError::NotAList)
            .and_then(parse_conditions)?;
        Ok(Self { logic, conditions })
    }

    /// Fields referenced by field conditions, in condition order.
    pub fn field_refs(&self) -> impl Iterator<Item = &ArtifactId> {
        self.conditions.iter().filter_map(|c| match c {
            Condition::Field { field_id, .. } => Some(field_id),
            _ => None,
        })
    }

    /// Functions referenced by function conditions, in condition order.
    pub fn function_refs(&self) -> impl Iterator<Item = &ArtifactId> {
        self.conditions.iter().filter_map(|c| match c {
            Condition::Function { function_id, .. } => Some(function_id),
            _ => None,
        })
    }

    /// Rules referenced by rule conditions, in condition order.
    pub fn rule_refs(&self) -> impl Iterator<Item = &ArtifactId> {
        self.conditions.iter().filter_map(|c| match c {
            Condition::Rule { rule_id } => Some(rule_id),
            _ => None,
        })
    }
}

impl ArtifactSpec for RuleSpec {
    const KIND: ArtifactKind = ArtifactKind::Rule;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.conditions.is_empty() {
            return Err(ConditionError::Empty.into());
        }
        Ok(())
    }
}
