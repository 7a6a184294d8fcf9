//! Store configuration, read from the `[store]` table of a TOML file.
//!
//! ```toml
//! [store]
//! path = "/var/lib/rulebook/rulebook.db"
//! busy_timeout_ms = 5000
//! enforce_foreign_keys = true
//! ```

use crate::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_enforce_foreign_keys() -> bool {
    true
}

/// Settings for [`crate::SqliteStore::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_enforce_foreign_keys")]
    pub enforce_foreign_keys: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            enforce_foreign_keys: default_enforce_foreign_keys(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    store: StoreConfig,
}

impl StoreConfig {
    /// In-memory database with default settings.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed database with default settings.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Loads the config from a TOML file.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No store config found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded store config from {:?}", path);
        Ok(config)
    }

    /// Parses the config from TOML text.
    pub fn from_toml_str(contents: &str) -> StoreResult<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(file.store)
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
