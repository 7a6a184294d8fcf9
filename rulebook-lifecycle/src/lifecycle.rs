//! The draft → active lifecycle of versioned artifacts.
//!
//! One [`VersionLifecycle`] per artifact kind. It holds no mutable state of
//! its own; every invariant it relies on (one active version, unique version
//! numbers) is enforced by the store, so any number of threads may share a
//! lifecycle and call into it concurrently.
//!
//! Publishing is two store writes followed by a change signal refresh: the
//! version seen as active is retired, then the draft is activated. Between
//! the two writes an artifact has no active version for a moment; it can
//! never have two. If activation fails after the retirement, the caller gets
//! [`Error::ActivationFailed`] and the signal is refreshed regardless.

use crate::validator::PublishCheck;
use crate::{ConfigSignal, Error, NamespaceRegistry, Result};
use rulebook_model::{Artifact, ArtifactSpec, ValidationError};
use rulebook_storage::VersionedStore;
use rulebook_types::{ArtifactId, NamespaceId, Status, Version};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle manager for one kind of versioned artifact.
pub struct VersionLifecycle<S: ArtifactSpec> {
    namespaces: NamespaceRegistry,
    store: Arc<dyn VersionedStore<S>>,
    check: Arc<dyn PublishCheck<S>>,
    signal: ConfigSignal,
}

impl<S: ArtifactSpec> Clone for VersionLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            namespaces: self.namespaces.clone(),
            store: Arc::clone(&self.store),
            check: Arc::clone(&self.check),
            signal: self.signal.clone(),
        }
    }
}

impl<S: ArtifactSpec> VersionLifecycle<S> {
    pub fn new(
        namespaces: NamespaceRegistry,
        store: Arc<dyn VersionedStore<S>>,
        check: Arc<dyn PublishCheck<S>>,
        signal: ConfigSignal,
    ) -> Self {
        Self {
            namespaces,
            store,
            check,
            signal,
        }
    }

    fn describe(namespace: &NamespaceId, id: &ArtifactId) -> String {
        format!("{} {namespace}/{id}", S::KIND)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Creates the first draft of a new lineage.
    ///
    /// Fails with `AlreadyExists` if the artifact already has a draft or an
    /// active version. The draft takes version `max + 1`, so numbers of
    /// deleted or inactive versions are never handed out again.
    pub fn create(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        mut spec: S,
        created_by: &str,
    ) -> Result<Artifact<S>> {
        self.namespaces.ensure_exists(namespace)?;
        spec.normalize();

        let mut draft = Artifact::draft(
            namespace.clone(),
            artifact_id.clone(),
            Version::FIRST,
            spec,
            created_by,
        );
        draft.validate()?;

        if self.store.get_draft_version(namespace, artifact_id)?.is_some() {
            return Err(Error::AlreadyExists(format!(
                "draft of {}",
                Self::describe(namespace, artifact_id)
            )));
        }
        if self.store.get_active_version(namespace, artifact_id)?.is_some() {
            return Err(Error::AlreadyExists(format!(
                "active version of {}",
                Self::describe(namespace, artifact_id)
            )));
        }

        draft.version = self.store.get_max_version(namespace, artifact_id)?.next();
        self.insert_draft(&draft)?;
        debug!(
            "Created {} {}/{} v{} (draft)",
            S::KIND,
            namespace,
            artifact_id,
            draft.version
        );
        Ok(draft)
    }

    /// Edits the current draft in place, or starts a new draft from the
    /// active version when there is none.
    ///
    /// `updated_by` becomes the creator of a newly started draft; an edited
    /// draft keeps its original creator.
    pub fn update(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        mut spec: S,
        updated_by: &str,
    ) -> Result<Artifact<S>> {
        self.namespaces.ensure_exists(namespace)?;
        spec.normalize();
        spec.validate()?;

        if let Some(mut draft) = self.store.get_draft_version(namespace, artifact_id)? {
            draft.spec = spec;
            if !self.store.update(&draft)? {
                return Err(Error::NotFound(format!(
                    "draft of {}",
                    Self::describe(namespace, artifact_id)
                )));
            }
            debug!(
                "Updated {} {}/{} v{} (draft)",
                S::KIND,
                namespace,
                artifact_id,
                draft.version
            );
            return Ok(draft);
        }

        if self
            .store
            .get_active_version(namespace, artifact_id)?
            .is_none()
        {
            return Err(Error::NotFound(Self::describe(namespace, artifact_id)));
        }

        let version = self.store.get_max_version(namespace, artifact_id)?.next();
        let draft = Artifact::draft(
            namespace.clone(),
            artifact_id.clone(),
            version,
            spec,
            updated_by,
        );
        draft.validate()?;
        self.insert_draft(&draft)?;
        debug!(
            "Started {} {}/{} v{} (draft) from the active version",
            S::KIND,
            namespace,
            artifact_id,
            version
        );
        Ok(draft)
    }

    fn insert_draft(&self, draft: &Artifact<S>) -> Result<()> {
        self.store.create(draft).map_err(|e| {
            if e.is_conflict() {
                Error::AlreadyExists(format!(
                    "{} v{}",
                    Self::describe(&draft.namespace, &draft.artifact_id),
                    draft.version
                ))
            } else {
                e.into()
            }
        })
    }

    /// Promotes the draft to active, retiring the previous active version.
    ///
    /// The publish check runs first; if it fails nothing is written. On
    /// success the namespace's change signal is refreshed; if only that
    /// refresh fails the result is [`Error::SignalRefresh`] and the new
    /// version is live regardless.
    ///
    /// Losing a race to another publisher of the same draft is `NotFound`
    /// with nothing changed.
    pub fn publish(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        published_by: &str,
    ) -> Result<Artifact<S>> {
        self.namespaces.ensure_exists(namespace)?;
        if published_by.trim().is_empty() {
            return Err(ValidationError::MissingPublisher.into());
        }

        let draft = self
            .store
            .get_draft_version(namespace, artifact_id)?
            .ok_or_else(|| {
                Error::NotFound(format!("draft of {}", Self::describe(namespace, artifact_id)))
            })?;
        draft.validate()?;

        if let Err(e) = self.check.check(&draft) {
            warn!(
                "Rejected publish of {} {}/{} v{}: {}",
                S::KIND,
                namespace,
                artifact_id,
                draft.version,
                e
            );
            return Err(e);
        }

        // Only an older active version is retired. An active version at or
        // above the draft's means another caller already published it.
        let previous = self.store.get_active_version(namespace, artifact_id)?;
        let retired = match previous {
            Some(prev) if prev.version < draft.version => self
                .store
                .deactivate_version(namespace, artifact_id, prev.version)?
                .then_some(prev.version),
            _ => None,
        };

        let failure = match self
            .store
            .publish(namespace, artifact_id, draft.version, published_by)
        {
            Ok(true) => None,
            Ok(false) => Some(Error::NotFound(format!(
                "draft of {}",
                Self::describe(namespace, artifact_id)
            ))),
            Err(e) => Some(Error::from(e)),
        };
        if let Some(err) = failure {
            return Err(match retired {
                Some(retired) => {
                    self.activation_failed(namespace, artifact_id, retired, draft.version, err)
                }
                None => err,
            });
        }
        info!(
            "Published {} {}/{} v{} by {}",
            S::KIND,
            namespace,
            artifact_id,
            draft.version,
            published_by
        );

        self.refresh_signal(namespace, artifact_id, draft.version)?;

        self.store
            .get_by_id(namespace, artifact_id, draft.version)?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} v{}",
                    Self::describe(namespace, artifact_id),
                    draft.version
                ))
            })
    }

    /// Retires the active version without a replacement. A no-op when
    /// nothing is active.
    pub fn deactivate(&self, namespace: &NamespaceId, artifact_id: &ArtifactId) -> Result<()> {
        self.namespaces.ensure_exists(namespace)?;
        let Some(active) = self.store.get_active_version(namespace, artifact_id)? else {
            return Ok(());
        };
        if self.store.deactivate(namespace, artifact_id)? == 0 {
            return Ok(());
        }
        info!(
            "Deactivated {} {}/{} v{}",
            S::KIND,
            namespace,
            artifact_id,
            active.version
        );
        self.refresh_signal(namespace, artifact_id, active.version)
    }

    /// Deletes exactly one version. Other versions are untouched.
    pub fn delete(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        version: Version,
    ) -> Result<()> {
        let not_found = || {
            Error::NotFound(format!(
                "{} v{}",
                Self::describe(namespace, artifact_id),
                version
            ))
        };
        let existing = self
            .store
            .get_by_id(namespace, artifact_id, version)?
            .ok_or_else(not_found)?;
        if !self.store.delete(namespace, artifact_id, version)? {
            return Err(not_found());
        }
        info!(
            "Deleted {} {}/{} v{} ({})",
            S::KIND,
            namespace,
            artifact_id,
            version,
            existing.status
        );
        if existing.status == Status::Active {
            self.refresh_signal(namespace, artifact_id, version)?;
        }
        Ok(())
    }

    /// The previous active version is already retired, so the active set
    /// changed even though the draft never went live.
    fn activation_failed(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        retired: Version,
        version: Version,
        cause: Error,
    ) -> Error {
        warn!(
            "Retired {} {}/{} v{} but could not activate v{}: {}",
            S::KIND,
            namespace,
            artifact_id,
            retired,
            version,
            cause
        );
        if let Err(e) = self.refresh_signal(namespace, artifact_id, retired) {
            return e;
        }
        Error::ActivationFailed {
            kind: S::KIND,
            namespace: namespace.clone(),
            artifact_id: artifact_id.clone(),
            retired,
            version,
            source: Box::new(cause),
        }
    }

    fn refresh_signal(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        version: Version,
    ) -> Result<()> {
        self.signal.refresh(namespace).map(|_| ()).map_err(|source| {
            warn!(
                "Change signal refresh failed for {} after {} {}/{} v{}: {}",
                namespace,
                S::KIND,
                namespace,
                artifact_id,
                version,
                source
            );
            Error::SignalRefresh {
                kind: S::KIND,
                namespace: namespace.clone(),
                artifact_id: artifact_id.clone(),
                version,
                source,
            }
        })
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The active version, or the draft if nothing is active yet.
    pub fn get(&self, namespace: &NamespaceId, artifact_id: &ArtifactId) -> Result<Artifact<S>> {
        if let Some(active) = self.store.get_active_version(namespace, artifact_id)? {
            return Ok(active);
        }
        self.store
            .get_draft_version(namespace, artifact_id)?
            .ok_or_else(|| Error::NotFound(Self::describe(namespace, artifact_id)))
    }

    pub fn get_active(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
    ) -> Result<Artifact<S>> {
        self.store
            .get_active_version(namespace, artifact_id)?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "active version of {}",
                    Self::describe(namespace, artifact_id)
                ))
            })
    }

    pub fn get_draft(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
    ) -> Result<Artifact<S>> {
        self.store
            .get_draft_version(namespace, artifact_id)?
            .ok_or_else(|| {
                Error::NotFound(format!("draft of {}", Self::describe(namespace, artifact_id)))
            })
    }

    pub fn get_version(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        version: Version,
    ) -> Result<Artifact<S>> {
        self.store
            .get_by_id(namespace, artifact_id, version)?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} v{}",
                    Self::describe(namespace, artifact_id),
                    version
                ))
            })
    }

    /// Every version of every artifact, ordered by id then version.
    pub fn list(&self, namespace: &NamespaceId) -> Result<Vec<Artifact<S>>> {
        Ok(self.store.list(namespace)?)
    }

    pub fn list_active(&self, namespace: &NamespaceId) -> Result<Vec<Artifact<S>>> {
        Ok(self.store.list_active(namespace)?)
    }

    /// All versions of one artifact, newest first.
    pub fn list_versions(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
    ) -> Result<Vec<Artifact<S>>> {
        Ok(self.store.list_versions(namespace, artifact_id)?)
    }

    /// Highest version ever created, [`Version::ZERO`] if none.
    pub fn max_version(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
    ) -> Result<Version> {
        Ok(self.store.get_max_version(namespace, artifact_id)?)
    }

    pub fn exists(
        &self,
        namespace: &NamespaceId,
        artifact_id: &ArtifactId,
        version: Version,
    ) -> Result<bool> {
        Ok(self.store.exists(namespace, artifact_id, version)?)
    }
}
