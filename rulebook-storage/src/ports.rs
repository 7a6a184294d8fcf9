//! Storage ports.
//!
//! The lifecycle layer only ever talks to these traits. Each one is a thin
//! persistence capability with no versioning policy of its own: "absent"
//! comes back as `None`/`false`, and deciding what that means is left to
//! the caller.

use crate::StoreResult;
use rulebook_model::{ActiveConfigMeta, Artifact, ArtifactSpec, Field, Namespace, Terminal};
use rulebook_types::{ArtifactId, NamespaceId, Version};

/// Namespace persistence.
pub trait NamespaceStore: Send + Sync {
    /// Inserts a namespace. A duplicate id is a [`crate::StoreError::Conflict`].
    fn create_namespace(&self, namespace: &Namespace) -> StoreResult<()>;

    fn get_namespace(&self, id: &NamespaceId) -> StoreResult<Option<Namespace>>;

    /// All namespaces ordered by id.
    fn list_namespaces(&self) -> StoreResult<Vec<Namespace>>;

    /// Removes a namespace together with every artifact and the change
    /// signal scoped to it. Returns `false` if it did not exist.
    fn delete_namespace(&self, id: &NamespaceId) -> StoreResult<bool>;
}

/// Field persistence (unversioned).
pub trait FieldStore: Send + Sync {
    fn create_field(&self, field: &Field) -> StoreResult<()>;
    fn get_field(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<Option<Field>>;
    fn list_fields(&self, namespace: &NamespaceId) -> StoreResult<Vec<Field>>;
    /// Overwrites type and description. Returns `false` if the field is absent.
    fn update_field(&self, field: &Field) -> StoreResult<bool>;
    fn delete_field(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool>;
    fn field_exists(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool>;
    fn count_fields(&self, namespace: &NamespaceId) -> StoreResult<usize>;
}

/// Terminal persistence (unversioned).
pub trait TerminalStore: Send + Sync {
    fn create_terminal(&self, terminal: &Terminal) -> StoreResult<()>;
    fn get_terminal(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Option<Terminal>>;
    fn list_terminals(&self, namespace: &NamespaceId) -> StoreResult<Vec<Terminal>>;
    fn delete_terminal(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool>;
    fn terminal_exists(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool>;
    fn count_terminals(&self, namespace: &NamespaceId) -> StoreResult<usize>;
}

/// Versioned artifact persistence, one family per spec type.
///
/// Implementations must guarantee that at most one row per
/// `(namespace, artifact_id)` is active: an activation that would create a
/// second one fails with [`crate::StoreError::Conflict`].
pub trait VersionedStore<S: ArtifactSpec>: Send + Sync {
    /// Inserts a new row exactly as given.
    fn create(&self, artifact: &Artifact<S>) -> StoreResult<()>;

    fn get_by_id(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
    ) -> StoreResult<Option<Artifact<S>>>;

    fn get_active_version(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Option<Artifact<S>>>;

    fn get_draft_version(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Option<Artifact<S>>>;

    /// Every version of every artifact in the namespace, ordered by
    /// artifact id then version.
    fn list(&self, namespace: &NamespaceId) -> StoreResult<Vec<Artifact<S>>>;

    /// Active versions only, ordered by artifact id.
    fn list_active(&self, namespace: &NamespaceId) -> StoreResult<Vec<Artifact<S>>>;

    /// All versions of one artifact, newest first.
    fn list_versions(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Vec<Artifact<S>>>;

    /// Overwrites the payload of a draft row in place. Returns `false` if no
    /// draft exists at that version.
    fn update(&self, artifact: &Artifact<S>) -> StoreResult<bool>;

    fn delete(&self, namespace: &NamespaceId, id: &ArtifactId, version: Version)
    -> StoreResult<bool>;

    fn exists(&self, namespace: &NamespaceId, id: &ArtifactId, version: Version)
    -> StoreResult<bool>;

    /// Highest version across all statuses, [`Version::ZERO`] if none.
    fn get_max_version(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<Version>;

    /// Moves the active row, if any, to inactive. Returns the number of rows
    /// changed (0 or 1).
    fn deactivate(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<usize>;

    /// Moves `version` to inactive if it is still the active row. Returns
    /// `false` when it was not active any more.
    fn deactivate_version(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
    ) -> StoreResult<bool>;

    /// Moves a draft row to active and stamps the publisher. Returns `false`
    /// if no draft exists at that version.
    fn publish(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
        published_by: &str,
    ) -> StoreResult<bool>;
}

/// Per-namespace change signal persistence.
pub trait ChangeSignalStore: Send + Sync {
    fn get_signal(&self, namespace: &NamespaceId) -> StoreResult<Option<ActiveConfigMeta>>;

    /// Inserts or replaces the signal, stamping `updated_at` with now.
    fn upsert_signal(&self, namespace: &NamespaceId, checksum: &str)
    -> StoreResult<ActiveConfigMeta>;

    fn delete_signal(&self, namespace: &NamespaceId) -> StoreResult<bool>;

    /// Every signal ordered by namespace.
    fn list_signals(&self) -> StoreResult<Vec<ActiveConfigMeta>>;
}

/// Deterministic digest of a namespace's active set.
///
/// Two calls return the same value exactly when the active functions,
/// rules and workflows (ids, versions and payloads) are the same.
pub trait ActiveSetDigest: Send + Sync {
    fn active_set_digest(&self, namespace: &NamespaceId) -> StoreResult<String>;
}
