use crate::{ArtifactSpec, ValidationError};
use rulebook_types::{ArtifactId, ArtifactKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation performed by a derived function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    Max,
    Sum,
    Avg,
    /// Membership test against a literal list.
    In,
}

impl FunctionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FunctionType::Max => "max",
            FunctionType::Sum => "sum",
            FunctionType::Avg => "avg",
            FunctionType::In => "in",
        }
    }

    /// The result type a function of this type produces.
    #[must_use]
    pub const fn return_type(self) -> ReturnType {
        match self {
            FunctionType::Max | FunctionType::Sum | FunctionType::Avg => ReturnType::Number,
            FunctionType::In => ReturnType::Bool,
        }
    }

    /// Whether this type reads field arguments (as opposed to literal values).
    #[must_use]
    pub const fn takes_args(self) -> bool {
        !matches!(self, FunctionType::In)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(FunctionType::Max),
            "sum" => Ok(FunctionType::Sum),
            "avg" => Ok(FunctionType::Avg),
            "in" => Ok(FunctionType::In),
            other => Err(ValidationError::InvalidFunctionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    Number,
    Bool,
}

/// Payload of a function version.
///
/// `args` and `values` are mutually exclusive; which one is populated is
/// decided by `function_type`. `return_type` is derived and recomputed by
/// [`ArtifactSpec::normalize`] before every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    #[serde(rename = "type")]
    pub function_type: FunctionType,
    #[serde(default)]
    pub args: Vec<ArtifactId>,
    #[serde(default)]
    pub values: Vec<String>,
    pub return_type: ReturnType,
}

impl FunctionSpec {
    /// A `max`, `sum` or `avg` function over the given fields.
    pub fn aggregate(function_type: FunctionType, args: Vec<ArtifactId>) -> Self {
        Self {
            function_type,
            args,
            values: Vec::new(),
            return_type: function_type.return_type(),
        }
    }

    /// An `in` function over the given literal values.
    pub fn membership(values: Vec<String>) -> Self {
        Self {
            function_type: FunctionType::In,
            args: Vec::new(),
            values,
            return_type: ReturnType::Bool,
        }
    }
}

impl ArtifactSpec for FunctionSpec {
    const KIND: ArtifactKind = ArtifactKind::Function;

    fn validate(&self) -> Result<(), ValidationError> {
        let function_type = self.function_type.as_str();
        if self.function_type.takes_args() {
            if self.args.is_empty() {
                return Err(ValidationError::InvalidFunctionArgs {
                    function_type,
                    reason: "args must not be empty",
                });
            }
            if !self.values.is_empty() {
                return Err(ValidationError::InvalidFunctionArgs {
                    function_type,
                    reason: "values must be empty",
                });
            }
        } else {
            if self.values.is_empty() {
                return Err(ValidationError::InvalidFunctionArgs {
                    function_type,
                    reason: "values must not be empty",
                });
            }
            if !self.args.is_empty() {
                return Err(ValidationError::InvalidFunctionArgs {
                    function_type,
                    reason: "args must be empty",
                });
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.return_type = self.function_type.return_type();
    }
}
