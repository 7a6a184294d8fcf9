//! Publish-time dependency checks.
//!
//! Drafts may reference things that do not exist yet. Publishing may not:
//! whatever an active artifact refers to must itself be live. These checks
//! are read-only and run before the lifecycle touches any row.

use crate::{DependencyError, Result};
use rulebook_model::{Artifact, ArtifactSpec, Condition, FunctionSpec, RuleSpec, WorkflowSpec};
use rulebook_storage::{FieldStore, TerminalStore, VersionedStore};
use rulebook_types::{ArtifactId, NamespaceId, Version};
use std::collections::HashSet;
use std::sync::Arc;

/// A check that must pass before a draft of `S` may be published.
pub trait PublishCheck<S: ArtifactSpec>: Send + Sync {
    fn check(&self, draft: &Artifact<S>) -> Result<()>;
}

/// Accepts every draft.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChecks;

impl<S: ArtifactSpec> PublishCheck<S> for NoChecks {
    fn check(&self, _draft: &Artifact<S>) -> Result<()> {
        Ok(())
    }
}

/// Requires an active version of `id`, telling "never existed" apart from
/// "exists but not live".
fn require_active<S: ArtifactSpec>(
    store: &dyn VersionedStore<S>,
    namespace: &NamespaceId,
    id: &ArtifactId,
    not_found: fn(ArtifactId) -> DependencyError,
    not_active: fn(ArtifactId) -> DependencyError,
) -> Result<Artifact<S>> {
    if let Some(active) = store.get_active_version(namespace, id)? {
        return Ok(active);
    }
    if store.get_max_version(namespace, id)? > Version::ZERO {
        Err(not_active(id.clone()).into())
    } else {
        Err(not_found(id.clone()).into())
    }
}

// ── Rules ────────────────────────────────────────────────────────

/// Checks a rule's conditions against the namespace's fields, functions
/// and rules.
///
/// Field conditions need the field to exist. Function and rule conditions
/// need an active version. A rule may not reach itself through the
/// conditions of active rules.
#[derive(Clone)]
pub struct RuleDependencies {
    fields: Arc<dyn FieldStore>,
    functions: Arc<dyn VersionedStore<FunctionSpec>>,
    rules: Arc<dyn VersionedStore<RuleSpec>>,
}

impl RuleDependencies {
    pub fn new(
        fields: Arc<dyn FieldStore>,
        functions: Arc<dyn VersionedStore<FunctionSpec>>,
        rules: Arc<dyn VersionedStore<RuleSpec>>,
    ) -> Self {
        Self {
            fields,
            functions,
            rules,
        }
    }

    /// Validates the conditions of `rule_id` as if `spec` were its active
    /// version. Stops at the first failing condition, in condition order.
    pub fn validate(
        &self,
        namespace: &NamespaceId,
        rule_id: &ArtifactId,
        spec: &RuleSpec,
    ) -> Result<()> {
        for condition in &spec.conditions {
            match condition {
                Condition::Field { field_id, .. } => {
                    if !self.fields.field_exists(namespace, field_id)? {
                        return Err(DependencyError::FieldNotFound(field_id.clone()).into());
                    }
                }
                Condition::Function { function_id, .. } => {
                    require_active(
                        self.functions.as_ref(),
                        namespace,
                        function_id,
                        DependencyError::FunctionNotFound,
                        DependencyError::FunctionNotActive,
                    )?;
                }
                Condition::Rule { rule_id: target } => {
                    require_active(
                        self.rules.as_ref(),
                        namespace,
                        target,
                        DependencyError::RuleNotFound,
                        DependencyError::RuleNotActive,
                    )?;
                }
            }
        }

        if let Some(path) = self.find_cycle(namespace, rule_id, spec)? {
            return Err(DependencyError::RuleCycle(path).into());
        }
        Ok(())
    }

    /// Depth-first walk from `root`'s references through active rules.
    fn find_cycle(
        &self,
        namespace: &NamespaceId,
        root: &ArtifactId,
        spec: &RuleSpec,
    ) -> Result<Option<Vec<ArtifactId>>> {
        let mut path = vec![root.clone()];
        let mut visited = HashSet::new();
        let refs: Vec<ArtifactId> = spec.rule_refs().cloned().collect();
        self.walk(namespace, root, refs, &mut path, &mut visited)
    }

    fn walk(
        &self,
        namespace: &NamespaceId,
        root: &ArtifactId,
        refs: Vec<ArtifactId>,
        path: &mut Vec<ArtifactId>,
        visited: &mut HashSet<ArtifactId>,
    ) -> Result<Option<Vec<ArtifactId>>> {
        for next in refs {
            if &next == root {
                let mut cycle = path.clone();
                cycle.push(next);
                return Ok(Some(cycle));
            }
            if !visited.insert(next.clone()) {
                continue;
            }
            let Some(active) = self.rules.get_active_version(namespace, &next)? else {
                continue;
            };
            let deeper: Vec<ArtifactId> = active.spec.rule_refs().cloned().collect();
            path.push(next);
            if let Some(cycle) = self.walk(namespace, root, deeper, path, visited)? {
                return Ok(Some(cycle));
            }
            path.pop();
        }
        Ok(None)
    }
}

impl PublishCheck<RuleSpec> for RuleDependencies {
    fn check(&self, draft: &Artifact<RuleSpec>) -> Result<()> {
        self.validate(&draft.namespace, &draft.artifact_id, &draft.spec)
    }
}

// ── Workflows ────────────────────────────────────────────────────

/// Every rule a workflow branches on must be active, and every terminal it
/// ends in must exist.
#[derive(Clone)]
pub struct WorkflowDependencies {
    rules: Arc<dyn VersionedStore<RuleSpec>>,
    terminals: Arc<dyn TerminalStore>,
}

impl WorkflowDependencies {
    pub fn new(
        rules: Arc<dyn VersionedStore<RuleSpec>>,
        terminals: Arc<dyn TerminalStore>,
    ) -> Self {
        Self { rules, terminals }
    }

    pub fn validate(&self, namespace: &NamespaceId, spec: &WorkflowSpec) -> Result<()> {
        for rule_id in spec.rule_refs() {
            require_active(
                self.rules.as_ref(),
                namespace,
                rule_id,
                DependencyError::RuleNotFound,
                DependencyError::RuleNotActive,
            )?;
        }
        for terminal_id in spec.terminal_refs() {
            if !self.terminals.terminal_exists(namespace, terminal_id)? {
                return Err(DependencyError::TerminalNotFound(terminal_id.clone()).into());
            }
        }
        Ok(())
    }
}

impl PublishCheck<WorkflowSpec> for WorkflowDependencies {
    fn check(&self, draft: &Artifact<WorkflowSpec>) -> Result<()> {
        self.validate(&draft.namespace, &draft.spec)
    }
}
