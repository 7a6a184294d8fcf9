//! Core type definitions for Rulebook.
//!
//! This crate defines the small, storage-agnostic types every other crate
//! agrees on:
//! - Namespace and artifact identifiers (validated newtypes)
//! - Version numbers
//! - Artifact lifecycle status and artifact kinds
//!
//! Artifact payloads (functions, rules, workflows, ...) live in
//! `rulebook-model`, not here.

mod ids;
mod status;

pub use ids::{ArtifactId, NamespaceId, Version, MAX_NAMESPACE_ID_LEN};
pub use status::{ArtifactKind, Status};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing core types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid namespace id {value:?}: {reason}")]
    InvalidNamespaceId { value: String, reason: &'static str },

    #[error("invalid artifact id {0:?}: must not be blank")]
    InvalidArtifactId(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid artifact kind: {0}")]
    InvalidKind(String),
}
