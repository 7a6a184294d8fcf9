//! Workflow step graphs.
//!
//! A workflow is a decision graph: rule steps branch on a rule's outcome,
//! terminal steps end the walk with an outcome.

use crate::{ArtifactSpec, ValidationError, WorkflowError};
use rulebook_types::{ArtifactId, ArtifactKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkflowStep {
    /// Evaluate `rule_id` and continue at `on_true` or `on_false`.
    #[serde(rename_all = "camelCase")]
    Rule {
        rule_id: ArtifactId,
        on_true: String,
        on_false: String,
    },
    /// Stop with `terminal_id` as the outcome.
    #[serde(rename_all = "camelCase")]
    Terminal { terminal_id: ArtifactId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    pub start_at: String,
    pub steps: BTreeMap<String, WorkflowStep>,
}

impl WorkflowSpec {
    pub fn new(start_at: impl Into<String>, steps: BTreeMap<String, WorkflowStep>) -> Self {
        Self {
            start_at: start_at.into(),
            steps,
        }
    }

    /// Builds a spec from untrusted JSON of the shape
    /// `{"startAt": "..", "steps": {"name": {"type": ..}}}`.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let start_at = value
            .get("startAt")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let steps = value
            .get("steps")
            .cloned()
            .ok_or_else(|| WorkflowError::Malformed("steps is required".into()))?;
        let steps: BTreeMap<String, WorkflowStep> = serde_json::from_value(steps)
            .map_err(|e| WorkflowError::Malformed(e.to_string()))?;
        Ok(Self { start_at, steps })
    }

    /// Distinct rules referenced by rule steps.
    pub fn rule_refs(&self) -> BTreeSet<&ArtifactId> {
        self.steps
            .values()
            .filter_map(|step| match step {
                WorkflowStep::Rule { rule_id, .. } => Some(rule_id),
                WorkflowStep::Terminal { .. } => None,
            })
            .collect()
    }

    /// Distinct terminals referenced by terminal steps.
    pub fn terminal_refs(&self) -> BTreeSet<&ArtifactId> {
        self.steps
            .values()
            .filter_map(|step| match step {
                WorkflowStep::Terminal { terminal_id } => Some(terminal_id),
                WorkflowStep::Rule { .. } => None,
            })
            .collect()
    }

    fn check_cycles(&self) -> Result<(), WorkflowError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            spec: &'a WorkflowSpec,
            name: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Result<(), WorkflowError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|s| *s == name).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|s| (*s).to_string()).collect();
                    cycle.push(name.to_string());
                    return Err(WorkflowError::Cycle(cycle));
                }
                None => {}
            }
            marks.insert(name, Mark::Visiting);
            path.push(name);
            if let Some(WorkflowStep::Rule {
                on_true, on_false, ..
            }) = spec.steps.get(name)
            {
                visit(spec, on_true, marks, path)?;
                visit(spec, on_false, marks, path)?;
            }
            path.pop();
            marks.insert(name, Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        let mut path = Vec::new();
        for name in self.steps.keys() {
            visit(self, name, &mut marks, &mut path)?;
        }
        Ok(())
    }
}

impl ArtifactSpec for WorkflowSpec {
    const KIND: ArtifactKind = ArtifactKind::Workflow;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.start_at.trim().is_empty() {
            return Err(WorkflowError::MissingStartAt.into());
        }
        if !self.steps.contains_key(&self.start_at) {
            return Err(WorkflowError::UnknownStartStep(self.start_at.clone()).into());
        }
        for (name, step) in &self.steps {
            if let WorkflowStep::Rule {
                on_true, on_false, ..
            } = step
            {
                for (branch, target) in [("onTrue", on_true), ("onFalse", on_false)] {
                    if !self.steps.contains_key(target) {
                        return Err(WorkflowError::DanglingBranch {
                            step: name.clone(),
                            branch,
                            target: target.clone(),
                        }
                        .into());
                    }
                }
            }
        }
        // Branch targets are known to exist, so an acyclic graph means every
        // walk from startAt ends at a terminal step.
        self.check_cycles()?;
        Ok(())
    }
}
