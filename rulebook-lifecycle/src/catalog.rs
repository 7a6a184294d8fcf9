//! Unversioned artifacts: fields and terminals.
//!
//! These have no draft/active split and are usable the moment they exist.

use crate::{Error, NamespaceRegistry, Result};
use rulebook_model::{Field, FieldType, Terminal};
use rulebook_storage::{FieldStore, StoreError, TerminalStore};
use rulebook_types::{ArtifactId, NamespaceId};
use std::sync::Arc;
use tracing::{debug, info};

fn already_exists_on_conflict(e: StoreError, what: impl FnOnce() -> String) -> Error {
    if e.is_conflict() {
        Error::AlreadyExists(what())
    } else {
        e.into()
    }
}

// ── Fields ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct FieldCatalog {
    namespaces: NamespaceRegistry,
    store: Arc<dyn FieldStore>,
}

impl FieldCatalog {
    pub fn new(namespaces: NamespaceRegistry, store: Arc<dyn FieldStore>) -> Self {
        Self { namespaces, store }
    }

    pub fn create(&self, field: Field) -> Result<Field> {
        field.validate()?;
        self.namespaces.ensure_exists(&field.namespace)?;
        self.store.create_field(&field).map_err(|e| {
            already_exists_on_conflict(e, || {
                format!("field {}/{}", field.namespace, field.field_id)
            })
        })?;
        debug!("Created field {}/{} (type={})", field.namespace, field.field_id, field.field_type);
        Ok(field)
    }

    pub fn get(&self, namespace: &NamespaceId, id: &ArtifactId) -> Result<Field> {
        self.store
            .get_field(namespace, id)?
            .ok_or_else(|| Error::NotFound(format!("field {namespace}/{id}")))
    }

    pub fn list(&self, namespace: &NamespaceId) -> Result<Vec<Field>> {
        Ok(self.store.list_fields(namespace)?)
    }

    /// Changes a field's type and description.
    pub fn update(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        field_type: FieldType,
        description: impl Into<String>,
    ) -> Result<Field> {
        let mut field = self.get(namespace, id)?;
        field.field_type = field_type;
        field.description = description.into();
        if !self.store.update_field(&field)? {
            return Err(Error::NotFound(format!("field {namespace}/{id}")));
        }
        debug!("Updated field {}/{} (type={})", namespace, id, field_type);
        Ok(field)
    }

    /// Deletes a field. Rules that reference it are not checked.
    pub fn delete(&self, namespace: &NamespaceId, id: &ArtifactId) -> Result<()> {
        if !self.store.delete_field(namespace, id)? {
            return Err(Error::NotFound(format!("field {namespace}/{id}")));
        }
        info!("Deleted field {}/{}", namespace, id);
        Ok(())
    }

    pub fn exists(&self, namespace: &NamespaceId, id: &ArtifactId) -> Result<bool> {
        Ok(self.store.field_exists(namespace, id)?)
    }

    pub fn count(&self, namespace: &NamespaceId) -> Result<usize> {
        Ok(self.store.count_fields(namespace)?)
    }
}

// ── Terminals ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TerminalCatalog {
    namespaces: NamespaceRegistry,
    store: Arc<dyn TerminalStore>,
}

impl TerminalCatalog {
    pub fn new(namespaces: NamespaceRegistry, store: Arc<dyn TerminalStore>) -> Self {
        Self { namespaces, store }
    }

    pub fn create(&self, terminal: Terminal) -> Result<Terminal> {
        terminal.validate()?;
        self.namespaces.ensure_exists(&terminal.namespace)?;
        self.store.create_terminal(&terminal).map_err(|e| {
            already_exists_on_conflict(e, || {
                format!("terminal {}/{}", terminal.namespace, terminal.terminal_id)
            })
        })?;
        debug!("Created terminal {}/{}", terminal.namespace, terminal.terminal_id);
        Ok(terminal)
    }

    pub fn get(&self, namespace: &NamespaceId, id: &ArtifactId) -> Result<Terminal> {
        self.store
            .get_terminal(namespace, id)?
            .ok_or_else(|| Error::NotFound(format!("terminal {namespace}/{id}")))
    }

    pub fn list(&self, namespace: &NamespaceId) -> Result<Vec<Terminal>> {
        Ok(self.store.list_terminals(namespace)?)
    }

    pub fn delete(&self, namespace: &NamespaceId, id: &ArtifactId) -> Result<()> {
        if !self.store.delete_terminal(namespace, id)? {
            return Err(Error::NotFound(format!("terminal {namespace}/{id}")));
        }
        info!("Deleted terminal {}/{}", namespace, id);
        Ok(())
    }

    pub fn exists(&self, namespace: &NamespaceId, id: &ArtifactId) -> Result<bool> {
        Ok(self.store.terminal_exists(namespace, id)?)
    }

    pub fn count(&self, namespace: &NamespaceId) -> Result<usize> {
        Ok(self.store.count_terminals(namespace)?)
    }
}
