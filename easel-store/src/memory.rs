//! In-memory store.
//!
//! Thread-safe via `RwLock`. Tables vanish with the process; meant for tests
//! and embedding. Besides the [`ContentStore`] contract it counts open
//! cursors and can be told to fail its next batch (see [`Fault`]).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use easel_core::{Authority, ContentUri, Row};

use crate::batch::{self, BatchError, Fault, Operation, OperationResult};
use crate::cursor::RowCursor;
use crate::error::{Rejection, StoreError};
use crate::query::{Query, Selection};
use crate::store::{now_seconds, ContentStore};
use crate::table::Table;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Authority, Table>>,
    open_cursors: Arc<AtomicUsize>,
    fault: Mutex<Option<Fault>>,
}

impl MemoryStore {
    /// Creates a store with no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_provider`](Self::add_provider).
    #[must_use]
    pub fn with_provider(self, authority: impl Into<Authority>) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.entry(authority.into()).or_default();
        }
        self
    }

    /// Start answering at `authority` with an empty table. Idempotent.
    pub fn add_provider(&self, authority: impl Into<Authority>) -> Result<(), StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .entry(authority.into())
            .or_default();
        Ok(())
    }

    /// Snapshot of the table behind `authority`.
    pub fn table(&self, authority: &Authority) -> Result<Table, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .get(authority)
            .cloned()
            .ok_or_else(|| StoreError::UnknownAuthority(authority.clone()))
    }

    /// Cursors handed out by `query` and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Make the next `apply_batch` call that reaches a table fail as
    /// described by `fault`.
    pub fn inject_fault(&self, fault: Fault) {
        if let Ok(mut slot) = self.fault.lock() {
            *slot = Some(fault);
        }
    }

    fn take_fault(&self) -> Option<Fault> {
        self.fault.lock().ok().and_then(|mut slot| slot.take())
    }

    fn write_table<T>(
        &self,
        uri: &ContentUri,
        f: impl FnOnce(&mut Table) -> T,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let table = tables
            .get_mut(uri.authority())
            .ok_or_else(|| StoreError::UnknownAuthority(uri.authority().clone()))?;
        Ok(f(table))
    }
}

impl ContentStore for MemoryStore {
    fn query(&self, uri: &ContentUri, query: &Query) -> Result<RowCursor, StoreError> {
        let rows = {
            let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
            let table = tables
                .get(uri.authority())
                .ok_or_else(|| StoreError::UnknownAuthority(uri.authority().clone()))?;
            table.query(uri.id(), query)
        };

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let open = Arc::clone(&self.open_cursors);
        Ok(RowCursor::with_release(rows, move || {
            open.fetch_sub(1, Ordering::SeqCst);
        }))
    }

    fn insert(&self, uri: &ContentUri, row: Row) -> Result<Option<ContentUri>, StoreError> {
        let now = now_seconds();
        let inserted = self.write_table(uri, |table| match uri.id() {
            Some(id) => Err(Rejection::InsertIntoRow { id }),
            None => table.insert(row, now),
        })?;
        match inserted {
            Ok(id) => Ok(Some(uri.with_id(id))),
            Err(rejection) => {
                tracing::warn!("insert into {uri} declined: {rejection}");
                Ok(None)
            }
        }
    }

    fn update(&self, uri: &ContentUri, row: Row, selection: &Selection) -> Result<usize, StoreError> {
        let now = now_seconds();
        Ok(self.write_table(uri, |table| table.update(uri.id(), row, selection, now))??)
    }

    fn delete(&self, uri: &ContentUri, selection: &Selection) -> Result<usize, StoreError> {
        self.write_table(uri, |table| table.delete(uri.id(), selection))
    }

    fn apply_batch(
        &self,
        authority: &Authority,
        operations: Vec<Operation>,
    ) -> Result<Vec<OperationResult>, BatchError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| BatchError::Unavailable("store lock poisoned".to_string()))?;
        let table = tables
            .get_mut(authority)
            .ok_or_else(|| BatchError::Unavailable(format!("unknown authority {authority}")))?;

        let fault = self.take_fault();
        let (committed, results) = batch::apply(table, authority, &operations, now_seconds(), fault)?;
        *table = committed;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use easel_core::{columns, ArtworkId, Value};

    use super::*;
    use crate::batch::BackReference;

    fn uri() -> ContentUri {
        ContentUri::new("com.example.art")
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_provider("com.example.art")
    }

    fn titled(title: &str) -> Row {
        [(columns::TITLE, Value::from(title))].into_iter().collect()
    }

    #[test]
    fn insert_returns_row_address() {
        let store = store();
        let inserted = store.insert(&uri(), titled("A")).unwrap();
        assert_eq!(inserted, Some(uri().with_id(ArtworkId(1))));
    }

    #[test]
    fn declined_insert_is_none() {
        let store = store();
        let row: Row = [("rating", Value::Integer(1))].into_iter().collect();
        assert_eq!(store.insert(&uri(), row).unwrap(), None);
        assert_eq!(store.insert(&uri().with_id(ArtworkId(1)), titled("A")).unwrap(), None);
    }

    #[test]
    fn unknown_authority_is_an_error() {
        let store = MemoryStore::new();
        let err = store.query(&uri(), &Query::all()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownAuthority(_)));
    }

    #[test]
    fn cursors_are_counted_until_dropped() {
        let store = store();
        store.insert(&uri(), titled("A")).unwrap();
        let cursor = store.query(&uri(), &Query::all()).unwrap();
        assert_eq!(store.open_cursors(), 1);
        drop(cursor);
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn row_address_scopes_query_and_delete() {
        let store = store();
        let first = store.insert(&uri(), titled("A")).unwrap().unwrap();
        store.insert(&uri(), titled("B")).unwrap();

        let rows: Vec<Row> = store.query(&first, &Query::all()).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(columns::TITLE), Some(&Value::from("A")));

        assert_eq!(store.delete(&first, &Selection::All).unwrap(), 1);
        assert_eq!(store.table(uri().authority()).unwrap().len(), 1);
    }

    #[test]
    fn update_token_change_is_rejected() {
        let store = store();
        let row: Row = [(columns::TOKEN, Value::from("t1"))].into_iter().collect();
        let inserted = store.insert(&uri(), row).unwrap().unwrap();
        let change: Row = [(columns::TOKEN, Value::from("t2"))].into_iter().collect();
        let err = store.update(&inserted, change, &Selection::All).unwrap_err();
        assert!(matches!(err, StoreError::Rejected(Rejection::TokenImmutable { .. })));
    }

    #[test]
    fn faulted_batch_leaves_table_unchanged() {
        let store = store();
        store.insert(&uri(), titled("old")).unwrap();
        let before = store.table(uri().authority()).unwrap();

        store.inject_fault(Fault::DropConnectionAfter(0));
        let plan = vec![
            Operation::Insert { uri: uri(), row: titled("new") },
            Operation::DeleteExcept { uri: uri(), keep: BackReference(0) },
        ];
        let err = store.apply_batch(uri().authority(), plan.clone()).unwrap_err();
        assert!(matches!(err, BatchError::Unavailable(_)));
        assert_eq!(store.table(uri().authority()).unwrap(), before);

        // The fault is one-shot.
        let results = store.apply_batch(uri().authority(), plan).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(store.table(uri().authority()).unwrap().len(), 1);
    }

    #[test]
    fn batch_against_unknown_authority_is_unavailable() {
        let store = MemoryStore::new();
        let err = store
            .apply_batch(&Authority::from("nobody.home"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, BatchError::Unavailable(_)));
    }

    #[test]
    fn fault_survives_batch_against_unknown_authority() {
        let store = store();
        store.inject_fault(Fault::RejectAt(0));

        let err = store
            .apply_batch(&Authority::from("nobody.home"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, BatchError::Unavailable(_)));

        let plan = vec![Operation::Insert { uri: uri(), row: titled("new") }];
        let err = store.apply_batch(uri().authority(), plan).unwrap_err();
        assert!(matches!(err, BatchError::Rejected { index: 0, .. }));
        assert!(store.table(uri().authority()).unwrap().is_empty());
    }
}
