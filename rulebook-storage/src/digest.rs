use rulebook_types::{ArtifactKind, NamespaceId};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};

/// Versioned tables in digest order.
pub(crate) const DIGEST_TABLES: [(ArtifactKind, &str); 3] = [
    (ArtifactKind::Function, "functions"),
    (ArtifactKind::Rule, "rules"),
    (ArtifactKind::Workflow, "workflows"),
];

/// SHA-256 (hex) over the active rows of a namespace.
///
/// Rows are fed in kind order then artifact id order; each contributes its
/// kind, id, version and stored payload, separated so that no two different
/// active sets produce the same byte stream.
pub(crate) fn active_set_digest(
    conn: &Connection,
    namespace: &NamespaceId,
) -> rusqlite::Result<String> {
    let mut hasher = Sha256::new();

    for (kind, table) in DIGEST_TABLES {
        let mut stmt = conn.prepare(&format!(
            "SELECT artifact_id, version, spec FROM {table}
             WHERE namespace = ?1 AND status = 'active'
             ORDER BY artifact_id"
        ))?;
        let rows = stmt.query_map(params![namespace.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        for row in rows {
            let (id, version, spec) = row?;
            hasher.update(kind.as_str().as_bytes());
            hasher.update(b"\x1f");
            hasher.update(id.as_bytes());
            hasher.update(b"\x1f");
            hasher.update(version.to_string().as_bytes());
            hasher.update(b"\x1f");
            hasher.update(spec.as_bytes());
            hasher.update(b"\x1e");
        }
    }

    Ok(hex::encode(hasher.finalize()))
}
