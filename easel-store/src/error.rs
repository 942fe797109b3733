//! Error types for easel-store.

use std::path::PathBuf;

use thiserror::Error;

use easel_core::{ArtworkId, Authority};

/// Transport- and storage-level failures. A store *declining* a row is not an
/// error: inserts report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table file could not be parsed.
    #[error("table JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No provider answers at this authority.
    #[error("unknown authority {0}")]
    UnknownAuthority(Authority),

    /// A direct update was refused by a table constraint.
    #[error("update rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// A table constraint refused a write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("token of row {id} cannot be changed")]
    TokenImmutable { id: ArtworkId },

    #[error("inserts must target a collection address, not row {id}")]
    InsertIntoRow { id: ArtworkId },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
