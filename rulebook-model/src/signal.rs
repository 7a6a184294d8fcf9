use chrono::{DateTime, Utc};
use rulebook_types::NamespaceId;
use serde::{Deserialize, Serialize};

/// Per-namespace change signal read by consumers of the active set.
///
/// `checksum` is opaque: consumers only compare it with the value they
/// last saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveConfigMeta {
    pub namespace: NamespaceId,
    pub checksum: String,
    pub updated_at: DateTime<Utc>,
}
