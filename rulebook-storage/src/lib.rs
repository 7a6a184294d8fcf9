//! Storage layer for Rulebook.
//!
//! [`ports`] defines the narrow persistence capabilities the lifecycle layer
//! depends on; [`SqliteStore`] implements all of them over one SQLite
//! database. The store holds no versioning policy: it inserts, reads and
//! flips statuses, and leaves the rules about when to do so to its caller.
//! The one invariant it does enforce is the hard one: at most one active
//! version per artifact, backed by a partial unique index.

mod config;
mod digest;
mod error;
pub mod ports;
mod sqlite;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use ports::{
    ActiveSetDigest, ChangeSignalStore, FieldStore, NamespaceStore, TerminalStore,
    VersionedStore,
};
pub use sqlite::SqliteStore;
