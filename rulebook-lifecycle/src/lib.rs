//! Versioning lifecycle for Rulebook.
//!
//! Drafts are created and edited freely; publishing promotes a draft to the
//! single active version of its artifact after the dependency checks pass,
//! then refreshes the namespace's change signal so consumers reload.
//!
//! # Components
//!
//! - [`NamespaceRegistry`]: namespace identity and existence checks
//! - [`FieldCatalog`], [`TerminalCatalog`]: unversioned artifacts
//! - [`VersionLifecycle`]: create / update / publish / deactivate / delete
//!   for functions, rules and workflows
//! - [`RuleDependencies`], [`WorkflowDependencies`]: publish-time reference
//!   checks, plugged in through [`PublishCheck`]
//! - [`ConfigSignal`]: the per-namespace checksum consumers poll
//!
//! [`Rulebook`] wires all of them over one [`SqliteStore`].

mod catalog;
mod error;
mod lifecycle;
mod registry;
mod signal;
mod validator;

pub use catalog::{FieldCatalog, TerminalCatalog};
pub use error::{DependencyError, Error, ErrorKind, Result};
pub use lifecycle::VersionLifecycle;
pub use registry::NamespaceRegistry;
pub use signal::ConfigSignal;
pub use validator::{NoChecks, PublishCheck, RuleDependencies, WorkflowDependencies};

use rulebook_model::{FunctionSpec, RuleSpec, WorkflowSpec};
use rulebook_storage::{SqliteStore, StoreConfig, VersionedStore};
use std::sync::Arc;

/// Every Rulebook service over one shared store.
#[derive(Clone)]
pub struct Rulebook {
    namespaces: NamespaceRegistry,
    fields: FieldCatalog,
    terminals: TerminalCatalog,
    functions: VersionLifecycle<FunctionSpec>,
    rules: VersionLifecycle<RuleSpec>,
    workflows: VersionLifecycle<WorkflowSpec>,
    signal: ConfigSignal,
}

impl Rulebook {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        let namespaces = NamespaceRegistry::new(store.clone());
        let signal = ConfigSignal::new(store.clone(), store.clone());
        let function_store: Arc<dyn VersionedStore<FunctionSpec>> = store.clone();
        let rule_store: Arc<dyn VersionedStore<RuleSpec>> = store.clone();
        let workflow_store: Arc<dyn VersionedStore<WorkflowSpec>> = store.clone();

        let rule_checks = RuleDependencies::new(
            store.clone(),
            function_store.clone(),
            rule_store.clone(),
        );
        let workflow_checks = WorkflowDependencies::new(rule_store.clone(), store.clone());

        Self {
            fields: FieldCatalog::new(namespaces.clone(), store.clone()),
            terminals: TerminalCatalog::new(namespaces.clone(), store),
            functions: VersionLifecycle::new(
                namespaces.clone(),
                function_store,
                Arc::new(NoChecks),
                signal.clone(),
            ),
            rules: VersionLifecycle::new(
                namespaces.clone(),
                rule_store,
                Arc::new(rule_checks),
                signal.clone(),
            ),
            workflows: VersionLifecycle::new(
                namespaces.clone(),
                workflow_store,
                Arc::new(workflow_checks),
                signal.clone(),
            ),
            namespaces,
            signal,
        }
    }

    /// Opens the store described by `config` and wires everything over it.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(SqliteStore::open(config)?)))
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn fields(&self) -> &FieldCatalog {
        &self.fields
    }

    pub fn terminals(&self) -> &TerminalCatalog {
        &self.terminals
    }

    pub fn functions(&self) -> &VersionLifecycle<FunctionSpec> {
        &self.functions
    }

    pub fn rules(&self) -> &VersionLifecycle<RuleSpec> {
        &self.rules
    }

    pub fn workflows(&self) -> &VersionLifecycle<WorkflowSpec> {
        &self.workflows
    }

    pub fn signal(&self) -> &ConfigSignal {
        &self.signal
    }
}
