//! The content store contract.

use std::sync::Arc;

use easel_core::{Authority, ContentUri, Row};

use crate::batch::{BatchError, Operation, OperationResult};
use crate::cursor::RowCursor;
use crate::error::StoreError;
use crate::query::{Query, Selection};

/// URI-addressed access to provider artwork tables.
///
/// A row address (`content://<authority>/<id>`) scopes `query`, `update` and
/// `delete` to that row. Stores implement [`apply_batch`](Self::apply_batch)
/// as a single transaction: either every operation is applied or none is.
pub trait ContentStore {
    /// Matching rows; an empty cursor, not an error, when nothing matches.
    fn query(&self, uri: &ContentUri, query: &Query) -> Result<RowCursor, StoreError>;

    /// Insert `row`. `Ok(None)` means the store declined it.
    fn insert(&self, uri: &ContentUri, row: Row) -> Result<Option<ContentUri>, StoreError>;

    /// Merge `row` into the selected rows. Returns the number matched.
    fn update(&self, uri: &ContentUri, row: Row, selection: &Selection) -> Result<usize, StoreError>;

    /// Delete the selected rows. Returns the number removed.
    fn delete(&self, uri: &ContentUri, selection: &Selection) -> Result<usize, StoreError>;

    /// Apply `operations` against `authority` as one transaction.
    fn apply_batch(
        &self,
        authority: &Authority,
        operations: Vec<Operation>,
    ) -> Result<Vec<OperationResult>, BatchError>;
}

impl<T: ContentStore + ?Sized> ContentStore for &T {
    fn query(&self, uri: &ContentUri, query: &Query) -> Result<RowCursor, StoreError> {
        (**self).query(uri, query)
    }

    fn insert(&self, uri: &ContentUri, row: Row) -> Result<Option<ContentUri>, StoreError> {
        (**self).insert(uri, row)
    }

    fn update(&self, uri: &ContentUri, row: Row, selection: &Selection) -> Result<usize, StoreError> {
        (**self).update(uri, row, selection)
    }

    fn delete(&self, uri: &ContentUri, selection: &Selection) -> Result<usize, StoreError> {
        (**self).delete(uri, selection)
    }

    fn apply_batch(
        &self,
        authority: &Authority,
        operations: Vec<Operation>,
    ) -> Result<Vec<OperationResult>, BatchError> {
        (**self).apply_batch(authority, operations)
    }
}

impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    fn query(&self, uri: &ContentUri, query: &Query) -> Result<RowCursor, StoreError> {
        (**self).query(uri, query)
    }

    fn insert(&self, uri: &ContentUri, row: Row) -> Result<Option<ContentUri>, StoreError> {
        (**self).insert(uri, row)
    }

    fn update(&self, uri: &ContentUri, row: Row, selection: &Selection) -> Result<usize, StoreError> {
        (**self).update(uri, row, selection)
    }

    fn delete(&self, uri: &ContentUri, selection: &Selection) -> Result<usize, StoreError> {
        (**self).delete(uri, selection)
    }

    fn apply_batch(
        &self,
        authority: &Authority,
        operations: Vec<Operation>,
    ) -> Result<Vec<OperationResult>, BatchError> {
        (**self).apply_batch(authority, operations)
    }
}

/// Seconds since the epoch, the unit of `date_added` / `date_modified`.
pub fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
