//! SQLite adapter implementing every storage port.
//!
//! One table per artifact kind. Versioned tables carry a partial unique
//! index on `(namespace, artifact_id) WHERE status = 'active'`, which is
//! what keeps two versions of an artifact from ever being active at once.

use crate::digest;
use crate::ports::{
    ActiveSetDigest, ChangeSignalStore, FieldStore, NamespaceStore, TerminalStore,
    VersionedStore,
};
use crate::{StoreConfig, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rulebook_model::{ActiveConfigMeta, Artifact, ArtifactSpec, Field, Namespace, Terminal};
use rulebook_types::{ArtifactId, ArtifactKind, NamespaceId, Status, Version};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const VERSION_COLUMNS: &str = "namespace, artifact_id, version, status, spec, \
     created_by, created_at, published_by, published_at";

/// Persistent store for all Rulebook artifacts, backed by SQLite.
///
/// Cheap to share: wrap it in an [`Arc`] and hand the same instance to
/// every port consumer.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens a store as described by `config`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout())?;
        if config.enforce_foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        info!(
            "Opened rulebook store ({})",
            config
                .path
                .as_deref()
                .map_or_else(|| "in-memory".to_string(), |p| p.display().to_string())
        );
        Ok(store)
    }

    /// Opens (or creates) a store at the given path with default settings.
    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(&StoreConfig::at(path.as_ref()))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS namespaces (
                id TEXT PRIMARY KEY,
                description TEXT NOT NULL DEFAULT '',
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS fields (
                namespace TEXT NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE,
                field_id TEXT NOT NULL,
                type TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (namespace, field_id)
            );

            CREATE TABLE IF NOT EXISTS terminals (
                namespace TEXT NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE,
                terminal_id TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (namespace, terminal_id)
            );

            CREATE TABLE IF NOT EXISTS active_config_meta (
                namespace TEXT PRIMARY KEY REFERENCES namespaces(id) ON DELETE CASCADE,
                checksum TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        for (_, table) in digest::DIGEST_TABLES {
            conn.execute_batch(&format!(
                "
                CREATE TABLE IF NOT EXISTS {table} (
                    namespace TEXT NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE,
                    artifact_id TEXT NOT NULL,
                    version INTEGER NOT NULL CHECK (version >= 1),
                    status TEXT NOT NULL CHECK (status IN ('draft', 'active', 'inactive')),
                    spec TEXT NOT NULL,
                    created_by TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    published_by TEXT,
                    published_at TEXT,
                    PRIMARY KEY (namespace, artifact_id, version)
                );

                CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_one_active
                    ON {table} (namespace, artifact_id) WHERE status = 'active';

                CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_one_draft
                    ON {table} (namespace, artifact_id) WHERE status = 'draft';
                "
            ))?;
        }
        Ok(())
    }
}

// ── Row helpers ──────────────────────────────────────────────────

fn ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

fn parse_ts(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {raw:?}: {e}")))
}

fn corrupt(e: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(e.to_string())
}

fn table_for(kind: ArtifactKind) -> StoreResult<&'static str> {
    digest::DIGEST_TABLES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, table)| *table)
        .ok_or_else(|| StoreError::Corrupt(format!("{kind} artifacts are not versioned")))
}

fn to_version(raw: i64) -> StoreResult<Version> {
    u32::try_from(raw)
        .map(Version::new)
        .map_err(|_| StoreError::Corrupt(format!("bad version {raw}")))
}

fn to_count(raw: i64) -> StoreResult<usize> {
    usize::try_from(raw).map_err(|_| StoreError::Corrupt(format!("bad row count {raw}")))
}

/// A versioned row as stored, before decoding.
struct VersionRow {
    namespace: String,
    artifact_id: String,
    version: i64,
    status: String,
    spec: String,
    created_by: String,
    created_at: String,
    published_by: Option<String>,
    published_at: Option<String>,
}

impl VersionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            namespace: row.get(0)?,
            artifact_id: row.get(1)?,
            version: row.get(2)?,
            status: row.get(3)?,
            spec: row.get(4)?,
            created_by: row.get(5)?,
            created_at: row.get(6)?,
            published_by: row.get(7)?,
            published_at: row.get(8)?,
        })
    }

    fn decode<S: ArtifactSpec>(self) -> StoreResult<Artifact<S>> {
        Ok(Artifact {
            namespace: NamespaceId::parse(&self.namespace).map_err(corrupt)?,
            artifact_id: ArtifactId::parse(&self.artifact_id).map_err(corrupt)?,
            version: to_version(self.version)?,
            status: self.status.parse::<Status>().map_err(corrupt)?,
            spec: serde_json::from_str(&self.spec)?,
            created_by: self.created_by,
            created_at: parse_ts(&self.created_at)?,
            published_by: self.published_by,
            published_at: self.published_at.as_deref().map(parse_ts).transpose()?,
        })
    }
}

fn query_versions<S: ArtifactSpec>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<Artifact<S>>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, VersionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(VersionRow::decode).collect()
}

fn query_version<S: ArtifactSpec>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Option<Artifact<S>>> {
    conn.query_row(sql, params, VersionRow::from_row)
        .optional()?
        .map(VersionRow::decode)
        .transpose()
}

fn exists(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> StoreResult<bool> {
    let found: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(found > 0)
}

// ── Namespaces ───────────────────────────────────────────────────

fn namespace_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_namespace(raw: (String, String, String, String)) -> StoreResult<Namespace> {
    let (id, description, created_by, created_at) = raw;
    Ok(Namespace {
        id: NamespaceId::parse(&id).map_err(corrupt)?,
        description,
        created_by,
        created_at: parse_ts(&created_at)?,
    })
}

impl NamespaceStore for SqliteStore {
    fn create_namespace(&self, namespace: &Namespace) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO namespaces (id, description, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                namespace.id.as_str(),
                namespace.description,
                namespace.created_by,
                ts(&namespace.created_at),
            ],
        )
        .map_err(|e| StoreError::from_write(e, || format!("namespace {} already exists", namespace.id)))?;
        debug!("Stored namespace {}", namespace.id);
        Ok(())
    }

    fn get_namespace(&self, id: &NamespaceId) -> StoreResult<Option<Namespace>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, description, created_by, created_at FROM namespaces WHERE id = ?1",
            params![id.as_str()],
            namespace_from_row,
        )
        .optional()?
        .map(decode_namespace)
        .transpose()
    }

    fn list_namespaces(&self) -> StoreResult<Vec<Namespace>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, description, created_by, created_at FROM namespaces ORDER BY id")?;
        let rows = stmt
            .query_map([], namespace_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_namespace).collect()
    }

    fn delete_namespace(&self, id: &NamespaceId) -> StoreResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        // Explicit so that stores opened without foreign key enforcement
        // still leave nothing behind.
        for table in [
            "fields",
            "terminals",
            "functions",
            "rules",
            "workflows",
            "active_config_meta",
        ] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE namespace = ?1"),
                params![id.as_str()],
            )?;
        }
        let deleted = tx.execute("DELETE FROM namespaces WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

// ── Fields ───────────────────────────────────────────────────────

type FieldRaw = (String, String, String, String, String, String);

fn field_from_row(row: &Row<'_>) -> rusqlite::Result<FieldRaw> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_field(raw: FieldRaw) -> StoreResult<Field> {
    let (namespace, field_id, field_type, description, created_by, created_at) = raw;
    Ok(Field {
        namespace: NamespaceId::parse(&namespace).map_err(corrupt)?,
        field_id: ArtifactId::parse(&field_id).map_err(corrupt)?,
        field_type: field_type.parse().map_err(corrupt)?,
        description,
        created_by,
        created_at: parse_ts(&created_at)?,
    })
}

const FIELD_COLUMNS: &str = "namespace, field_id, type, description, created_by, created_at";

impl FieldStore for SqliteStore {
    fn create_field(&self, field: &Field) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO fields ({FIELD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                field.namespace.as_str(),
                field.field_id.as_str(),
                field.field_type.as_str(),
                field.description,
                field.created_by,
                ts(&field.created_at),
            ],
        )
        .map_err(|e| {
            StoreError::from_write(e, || {
                format!("field {}/{} already exists", field.namespace, field.field_id)
            })
        })?;
        Ok(())
    }

    fn get_field(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<Option<Field>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {FIELD_COLUMNS} FROM fields WHERE namespace = ?1 AND field_id = ?2"),
            params![namespace.as_str(), id.as_str()],
            field_from_row,
        )
        .optional()?
        .map(decode_field)
        .transpose()
    }

    fn list_fields(&self, namespace: &NamespaceId) -> StoreResult<Vec<Field>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FIELD_COLUMNS} FROM fields WHERE namespace = ?1 ORDER BY field_id"
        ))?;
        let rows = stmt
            .query_map(params![namespace.as_str()], field_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_field).collect()
    }

    fn update_field(&self, field: &Field) -> StoreResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE fields SET type = ?3, description = ?4 WHERE namespace = ?1 AND field_id = ?2",
            params![
                field.namespace.as_str(),
                field.field_id.as_str(),
                field.field_type.as_str(),
                field.description,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_field(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM fields WHERE namespace = ?1 AND field_id = ?2",
            params![namespace.as_str(), id.as_str()],
        )?;
        Ok(deleted > 0)
    }

    fn field_exists(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool> {
        let conn = self.lock()?;
        exists(
            &conn,
            "SELECT COUNT(*) FROM fields WHERE namespace = ?1 AND field_id = ?2",
            params![namespace.as_str(), id.as_str()],
        )
    }

    fn count_fields(&self, namespace: &NamespaceId) -> StoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM fields WHERE namespace = ?1",
            params![namespace.as_str()],
            |row| row.get(0),
        )?;
        to_count(count)
    }
}

// ── Terminals ────────────────────────────────────────────────────

fn terminal_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_terminal(raw: (String, String, String, String)) -> StoreResult<Terminal> {
    let (namespace, terminal_id, created_by, created_at) = raw;
    Ok(Terminal {
        namespace: NamespaceId::parse(&namespace).map_err(corrupt)?,
        terminal_id: ArtifactId::parse(&terminal_id).map_err(corrupt)?,
        created_by,
        created_at: parse_ts(&created_at)?,
    })
}

impl TerminalStore for SqliteStore {
    fn create_terminal(&self, terminal: &Terminal) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO terminals (namespace, terminal_id, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                terminal.namespace.as_str(),
                terminal.terminal_id.as_str(),
                terminal.created_by,
                ts(&terminal.created_at),
            ],
        )
        .map_err(|e| {
            StoreError::from_write(e, || {
                format!("terminal {}/{} already exists", terminal.namespace, terminal.terminal_id)
            })
        })?;
        Ok(())
    }

    fn get_terminal(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Option<Terminal>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT namespace, terminal_id, created_by, created_at FROM terminals
             WHERE namespace = ?1 AND terminal_id = ?2",
            params![namespace.as_str(), id.as_str()],
            terminal_from_row,
        )
        .optional()?
        .map(decode_terminal)
        .transpose()
    }

    fn list_terminals(&self, namespace: &NamespaceId) -> StoreResult<Vec<Terminal>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT namespace, terminal_id, created_by, created_at FROM terminals
             WHERE namespace = ?1 ORDER BY terminal_id",
        )?;
        let rows = stmt
            .query_map(params![namespace.as_str()], terminal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_terminal).collect()
    }

    fn delete_terminal(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM terminals WHERE namespace = ?1 AND terminal_id = ?2",
            params![namespace.as_str(), id.as_str()],
        )?;
        Ok(deleted > 0)
    }

    fn terminal_exists(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<bool> {
        let conn = self.lock()?;
        exists(
            &conn,
            "SELECT COUNT(*) FROM terminals WHERE namespace = ?1 AND terminal_id = ?2",
            params![namespace.as_str(), id.as_str()],
        )
    }

    fn count_terminals(&self, namespace: &NamespaceId) -> StoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM terminals WHERE namespace = ?1",
            params![namespace.as_str()],
            |row| row.get(0),
        )?;
        to_count(count)
    }
}

// ── Versioned artifacts ──────────────────────────────────────────

impl<S: ArtifactSpec> VersionedStore<S> for SqliteStore {
    fn create(&self, artifact: &Artifact<S>) -> StoreResult<()> {
        let table = table_for(S::KIND)?;
        let spec = serde_json::to_string(&artifact.spec)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {table} ({VERSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                artifact.namespace.as_str(),
                artifact.artifact_id.as_str(),
                i64::from(artifact.version.get()),
                artifact.status.as_str(),
                spec,
                artifact.created_by,
                ts(&artifact.created_at),
                artifact.published_by,
                artifact.published_at.as_ref().map(ts),
            ],
        )
        .map_err(|e| {
            StoreError::from_write(e, || {
                format!(
                    "{} {}/{} v{} conflicts with an existing version",
                    S::KIND,
                    artifact.namespace,
                    artifact.artifact_id,
                    artifact.version
                )
            })
        })?;
        debug!(
            "Inserted {} {}/{} v{} ({})",
            S::KIND,
            artifact.namespace,
            artifact.artifact_id,
            artifact.version,
            artifact.status
        );
        Ok(())
    }

    fn get_by_id(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
    ) -> StoreResult<Option<Artifact<S>>> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        query_version(
            &conn,
            &format!(
                "SELECT {VERSION_COLUMNS} FROM {table}
                 WHERE namespace = ?1 AND artifact_id = ?2 AND version = ?3"
            ),
            params![namespace.as_str(), id.as_str(), i64::from(version.get())],
        )
    }

    fn get_active_version(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Option<Artifact<S>>> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        query_version(
            &conn,
            &format!(
                "SELECT {VERSION_COLUMNS} FROM {table}
                 WHERE namespace = ?1 AND artifact_id = ?2 AND status = 'active'"
            ),
            params![namespace.as_str(), id.as_str()],
        )
    }

    fn get_draft_version(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Option<Artifact<S>>> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        query_version(
            &conn,
            &format!(
                "SELECT {VERSION_COLUMNS} FROM {table}
                 WHERE namespace = ?1 AND artifact_id = ?2 AND status = 'draft'
                 ORDER BY version DESC LIMIT 1"
            ),
            params![namespace.as_str(), id.as_str()],
        )
    }

    fn list(&self, namespace: &NamespaceId) -> StoreResult<Vec<Artifact<S>>> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        query_versions(
            &conn,
            &format!(
                "SELECT {VERSION_COLUMNS} FROM {table}
                 WHERE namespace = ?1 ORDER BY artifact_id, version"
            ),
            params![namespace.as_str()],
        )
    }

    fn list_active(&self, namespace: &NamespaceId) -> StoreResult<Vec<Artifact<S>>> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        query_versions(
            &conn,
            &format!(
                "SELECT {VERSION_COLUMNS} FROM {table}
                 WHERE namespace = ?1 AND status = 'active' ORDER BY artifact_id"
            ),
            params![namespace.as_str()],
        )
    }

    fn list_versions(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
    ) -> StoreResult<Vec<Artifact<S>>> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        query_versions(
            &conn,
            &format!(
                "SELECT {VERSION_COLUMNS} FROM {table}
                 WHERE namespace = ?1 AND artifact_id = ?2 ORDER BY version DESC"
            ),
            params![namespace.as_str(), id.as_str()],
        )
    }

    fn update(&self, artifact: &Artifact<S>) -> StoreResult<bool> {
        let table = table_for(S::KIND)?;
        let spec = serde_json::to_string(&artifact.spec)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {table} SET spec = ?4
                 WHERE namespace = ?1 AND artifact_id = ?2 AND version = ?3 AND status = 'draft'"
            ),
            params![
                artifact.namespace.as_str(),
                artifact.artifact_id.as_str(),
                i64::from(artifact.version.get()),
                spec,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
    ) -> StoreResult<bool> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {table} WHERE namespace = ?1 AND artifact_id = ?2 AND version = ?3"),
            params![namespace.as_str(), id.as_str(), i64::from(version.get())],
        )?;
        Ok(deleted > 0)
    }

    fn exists(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
    ) -> StoreResult<bool> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        exists(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM {table}
                 WHERE namespace = ?1 AND artifact_id = ?2 AND version = ?3"
            ),
            params![namespace.as_str(), id.as_str(), i64::from(version.get())],
        )
    }

    fn get_max_version(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<Version> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        let max: i64 = conn.query_row(
            &format!(
                "SELECT COALESCE(MAX(version), 0) FROM {table}
                 WHERE namespace = ?1 AND artifact_id = ?2"
            ),
            params![namespace.as_str(), id.as_str()],
            |row| row.get(0),
        )?;
        to_version(max)
    }

    fn deactivate(&self, namespace: &NamespaceId, id: &ArtifactId) -> StoreResult<usize> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {table} SET status = 'inactive'
                 WHERE namespace = ?1 AND artifact_id = ?2 AND status = 'active'"
            ),
            params![namespace.as_str(), id.as_str()],
        )?;
        Ok(changed)
    }

    fn deactivate_version(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
    ) -> StoreResult<bool> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {table} SET status = 'inactive'
                 WHERE namespace = ?1 AND artifact_id = ?2 AND version = ?3 AND status = 'active'"
            ),
            params![namespace.as_str(), id.as_str(), i64::from(version.get())],
        )?;
        Ok(changed > 0)
    }

    fn publish(
        &self,
        namespace: &NamespaceId,
        id: &ArtifactId,
        version: Version,
        published_by: &str,
    ) -> StoreResult<bool> {
        let table = table_for(S::KIND)?;
        let conn = self.lock()?;
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {table} SET status = 'active', published_by = ?4, published_at = ?5
                     WHERE namespace = ?1 AND artifact_id = ?2 AND version = ?3 AND status = 'draft'"
                ),
                params![
                    namespace.as_str(),
                    id.as_str(),
                    i64::from(version.get()),
                    published_by,
                    ts(&Utc::now()),
                ],
            )
            .map_err(|e| {
                StoreError::from_write(e, || {
                    format!(
                        "{} {namespace}/{id} already has an active version",
                        S::KIND
                    )
                })
            })?;
        Ok(changed > 0)
    }
}

// ── Change signal ────────────────────────────────────────────────

fn decode_signal(raw: (String, String, String)) -> StoreResult<ActiveConfigMeta> {
    let (namespace, checksum, updated_at) = raw;
    Ok(ActiveConfigMeta {
        namespace: NamespaceId::parse(&namespace).map_err(corrupt)?,
        checksum,
        updated_at: parse_ts(&updated_at)?,
    })
}

impl ChangeSignalStore for SqliteStore {
    fn get_signal(&self, namespace: &NamespaceId) -> StoreResult<Option<ActiveConfigMeta>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT namespace, checksum, updated_at FROM active_config_meta WHERE namespace = ?1",
            params![namespace.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?
        .map(decode_signal)
        .transpose()
    }

    fn upsert_signal(
        &self,
        namespace: &NamespaceId,
        checksum: &str,
    ) -> StoreResult<ActiveConfigMeta> {
        let meta = ActiveConfigMeta {
            namespace: namespace.clone(),
            checksum: checksum.to_string(),
            updated_at: Utc::now(),
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO active_config_meta (namespace, checksum, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace) DO UPDATE SET
                 checksum = excluded.checksum,
                 updated_at = excluded.updated_at",
            params![namespace.as_str(), meta.checksum, ts(&meta.updated_at)],
        )
        .map_err(|e| StoreError::from_write(e, || format!("signal for {namespace}")))?;
        Ok(meta)
    }

    fn delete_signal(&self, namespace: &NamespaceId) -> StoreResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM active_config_meta WHERE namespace = ?1",
            params![namespace.as_str()],
        )?;
        Ok(deleted > 0)
    }

    fn list_signals(&self) -> StoreResult<Vec<ActiveConfigMeta>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT namespace, checksum, updated_at FROM active_config_meta ORDER BY namespace",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_signal).collect()
    }
}

impl ActiveSetDigest for SqliteStore {
    fn active_set_digest(&self, namespace: &NamespaceId) -> StoreResult<String> {
        let conn = self.lock()?;
        Ok(digest::active_set_digest(&conn, namespace)?)
    }
}
