use crate::{Error, Result};
use rulebook_model::ActiveConfigMeta;
use rulebook_storage::{ActiveSetDigest, ChangeSignalStore, StoreError, StoreResult};
use rulebook_types::NamespaceId;
use std::sync::{Arc, Mutex};
use tracing::info;

/// The per-namespace config change signal.
///
/// Consumers poll it and reload their active configuration when the
/// checksum differs from the one they last saw. The lifecycle refreshes it
/// after every change to a namespace's active set.
#[derive(Clone)]
pub struct ConfigSignal {
    signals: Arc<dyn ChangeSignalStore>,
    digest: Arc<dyn ActiveSetDigest>,
    // Held across digest + upsert so a slower refresh cannot overwrite a
    // newer checksum with a stale one.
    refresh_lock: Arc<Mutex<()>>,
}

impl ConfigSignal {
    pub fn new(signals: Arc<dyn ChangeSignalStore>, digest: Arc<dyn ActiveSetDigest>) -> Self {
        Self {
            signals,
            digest,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The current signal. `NotFound` if nothing was ever published in the
    /// namespace.
    pub fn get(&self, namespace: &NamespaceId) -> Result<ActiveConfigMeta> {
        self.signals
            .get_signal(namespace)?
            .ok_or_else(|| Error::NotFound(format!("change signal for namespace {namespace}")))
    }

    pub fn upsert(&self, namespace: &NamespaceId, checksum: &str) -> Result<ActiveConfigMeta> {
        Ok(self.signals.upsert_signal(namespace, checksum)?)
    }

    /// Removes the signal. Returns `false` if there was none.
    pub fn delete(&self, namespace: &NamespaceId) -> Result<bool> {
        Ok(self.signals.delete_signal(namespace)?)
    }

    pub fn list_all(&self) -> Result<Vec<ActiveConfigMeta>> {
        Ok(self.signals.list_signals()?)
    }

    /// Recomputes the namespace's active-set digest and stores it.
    ///
    /// Returns the raw store error so the caller can tell a failed refresh
    /// apart from a failed artifact write.
    pub(crate) fn refresh(&self, namespace: &NamespaceId) -> StoreResult<ActiveConfigMeta> {
        let _guard = self.refresh_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let checksum = self.digest.active_set_digest(namespace)?;
        let meta = self.signals.upsert_signal(namespace, &checksum)?;
        info!("Refreshed change signal for {} ({})", namespace, &checksum[..12.min(checksum.len())]);
        Ok(meta)
    }
}
