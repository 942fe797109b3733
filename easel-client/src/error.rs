//! Error types for easel-client.

use thiserror::Error;

use easel_core::{RegistryError, RowError};
use easel_store::{BatchError, StoreError};

/// Errors surfaced by [`RegistryClient`](crate::RegistryClient).
///
/// A declined insert is not an error; it comes back as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The provider could not be resolved to a live address.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The store could not be reached or refused the request outright.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A stored row could not be decoded into a record.
    #[error("malformed artwork row: {0}")]
    MalformedRow(#[from] RowError),
}

/// Why a batch produced no result. Nothing from the batch was applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchFailure {
    /// The plan was refused before it reached the store.
    #[error("invalid batch plan: {0}")]
    InvalidPlan(String),

    /// The store refused operation `index`.
    #[error("operation {index} rejected: {reason}")]
    Rejected { index: usize, reason: String },

    /// The store could not be reached or could not commit.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store reported success but did not return a usable result for
    /// every operation.
    #[error("expected {expected} batch results, got {got}")]
    MissingResults { expected: usize, got: usize },
}

impl From<BatchError> for BatchFailure {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Rejected { index, reason } => BatchFailure::Rejected { index, reason },
            BatchError::Unavailable(reason) => BatchFailure::Unavailable(reason),
        }
    }
}
