//! Rule conditions.
//!
//! On disk and on the wire a condition list is an ordered JSON array of
//! objects tagged by `type`:
//!
//! ```json
//! [
//!   {"type": "field",    "fieldId": "age",            "operator": ">=", "value": 18},
//!   {"type": "function", "functionId": "total_spend", "operator": ">",  "value": 100},
//!   {"type": "rule",     "ruleId": "adult"}
//! ]
//! ```
//!
//! [`parse_conditions`] turns untrusted JSON into the typed list with a
//! precise [`ConditionError`]; serde is used as-is for rows the store wrote.

use crate::ConditionError;
use rulebook_types::ArtifactId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a field or function condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            other => Err(other.to_string()),
        }
    }
}

/// A single rule condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    /// Compares an input field against a literal.
    #[serde(rename_all = "camelCase")]
    Field {
        field_id: ArtifactId,
        operator: Operator,
        value: Value,
    },
    /// Compares the result of a derived function against a literal.
    #[serde(rename_all = "camelCase")]
    Function {
        function_id: ArtifactId,
        operator: Operator,
        value: Value,
    },
    /// Uses the boolean outcome of another rule.
    #[serde(rename_all = "camelCase")]
    Rule { rule_id: ArtifactId },
}

impl Condition {
    pub fn field(field_id: ArtifactId, operator: Operator, value: impl Into<Value>) -> Self {
        Condition::Field {
            field_id,
            operator,
            value: value.into(),
        }
    }

    pub fn function(function_id: ArtifactId, operator: Operator, value: impl Into<Value>) -> Self {
        Condition::Function {
            function_id,
            operator,
            value: value.into(),
        }
    }

    pub fn rule(rule_id: ArtifactId) -> Self {
        Condition::Rule { rule_id }
    }
}

/// Parses and structurally validates an untrusted condition list.
///
/// Requires a non-empty array; every element must be an object carrying a
/// known `type` and the fields that type needs, and comparison operators
/// must be one of `== != > < >= <=`.
pub fn parse_conditions(value: &Value) -> Result<Vec<Condition>, ConditionError> {
    let items = value.as_array().ok_or(ConditionError::NotAList)?;
    if items.is_empty() {
        return Err(ConditionError::Empty);
    }
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_condition(index, item))
        .collect()
}

fn parse_condition(index: usize, item: &Value) -> Result<Condition, ConditionError> {
    let obj = item
        .as_object()
        .ok_or(ConditionError::NotAnObject { index })?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ConditionError::MissingType { index })?;

    match kind {
        "field" => {
            let (field_id, operator, value) = comparison(index, obj, "fieldId")?;
            Ok(Condition::Field {
                field_id,
                operator,
                value,
            })
        }
        "function" => {
            let (function_id, operator, value) = comparison(index, obj, "functionId")?;
            Ok(Condition::Function {
                function_id,
                operator,
                value,
            })
        }
        "rule" => Ok(Condition::Rule {
            rule_id: reference(index, obj, "ruleId")?,
        }),
        other => Err(ConditionError::UnknownType {
            index,
            found: other.to_string(),
        }),
    }
}

fn comparison(
    index: usize,
    obj: &Map<String, Value>,
    id_key: &'static str,
) -> Result<(ArtifactId, Operator, Value), ConditionError> {
    let id = reference(index, obj, id_key)?;
    let raw_op = obj
        .get("operator")
        .and_then(Value::as_str)
        .ok_or(ConditionError::MissingField {
            index,
            field: "operator",
        })?;
    let operator = raw_op
        .parse::<Operator>()
        .map_err(|operator| ConditionError::InvalidOperator { index, operator })?;
    let value = obj
        .get("value")
        .cloned()
        .ok_or(ConditionError::MissingField {
            index,
            field: "value",
        })?;
    Ok((id, operator, value))
}

fn reference(
    index: usize,
    obj: &Map<String, Value>,
    key: &'static str,
) -> Result<ArtifactId, ConditionError> {
    obj.get(key)
        .and_then(Value::as_str)
        .and_then(|s| ArtifactId::parse(s).ok())
        .ok_or(ConditionError::MissingField { index, field: key })
}
