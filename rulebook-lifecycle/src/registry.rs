use crate::{Error, Result};
use rulebook_model::Namespace;
use rulebook_storage::NamespaceStore;
use rulebook_types::NamespaceId;
use std::sync::Arc;
use tracing::info;

/// Owns namespace identity. Everything else checks existence through here.
#[derive(Clone)]
pub struct NamespaceRegistry {
    store: Arc<dyn NamespaceStore>,
}

impl NamespaceRegistry {
    pub fn new(store: Arc<dyn NamespaceStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, namespace: Namespace) -> Result<Namespace> {
        namespace.validate()?;
        match self.store.create_namespace(&namespace) {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                return Err(Error::AlreadyExists(format!("namespace {}", namespace.id)));
            }
            Err(e) => return Err(e.into()),
        }
        info!("Created namespace {}", namespace.id);
        Ok(namespace)
    }

    pub fn get(&self, id: &NamespaceId) -> Result<Namespace> {
        self.store
            .get_namespace(id)?
            .ok_or_else(|| Error::NotFound(format!("namespace {id}")))
    }

    pub fn list(&self) -> Result<Vec<Namespace>> {
        Ok(self.store.list_namespaces()?)
    }

    /// Deletes the namespace, every artifact in it, and its change signal.
    pub fn delete(&self, id: &NamespaceId) -> Result<()> {
        if !self.store.delete_namespace(id)? {
            return Err(Error::NotFound(format!("namespace {id}")));
        }
        info!("Deleted namespace {}", id);
        Ok(())
    }

    pub fn ensure_exists(&self, id: &NamespaceId) -> Result<()> {
        self.get(id).map(|_| ())
    }
}
