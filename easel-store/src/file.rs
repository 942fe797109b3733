//! File-backed store.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   <authority>.json   (one table per provider, created on first write)
//! ```
//!
//! Every mutating call loads the table, applies the change to that copy and
//! saves it with the same `.tmp` + rename pattern as the provider registry, so
//! a crash or failed save leaves the previous table on disk. Writers in this
//! process are serialized by a mutex; concurrent processes are not.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use easel_core::{registry::easel_root, Authority, ContentUri, Row};

use crate::batch::{self, BatchError, Operation, OperationResult};
use crate::cursor::RowCursor;
use crate::error::{io_err, Rejection, StoreError};
use crate::query::{Query, Selection};
use crate::store::{now_seconds, ContentStore};
use crate::table::Table;

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Store keeping its tables directly under `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store under `<home>/.easel/tables/`.
    pub fn at_home(home: &Path) -> Self {
        Self::open(easel_root(home).join("tables"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<authority>.json`. Pure, no I/O.
    pub fn table_path(&self, authority: &Authority) -> Result<PathBuf, StoreError> {
        let name = authority.as_str();
        if name.is_empty() || name.starts_with('.') || name.contains(&['/', '\\'][..]) {
            return Err(StoreError::UnknownAuthority(authority.clone()));
        }
        Ok(self.root.join(format!("{name}.json")))
    }

    /// Load the table for `authority`. A missing file is an empty table.
    pub fn load_table(&self, authority: &Authority) -> Result<Table, StoreError> {
        let path = self.table_path(authority)?;
        if !path.exists() {
            return Ok(Table::new());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Json { path, source })
    }

    /// Atomically replace the table file for `authority`.
    fn save_table(&self, authority: &Authority, table: &Table) -> Result<(), StoreError> {
        let path = self.table_path(authority)?;
        std::fs::create_dir_all(&self.root).map_err(|e| io_err(&self.root, e))?;

        let json = serde_json::to_string_pretty(table).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&path, e));
        }
        Ok(())
    }

    /// Load → mutate → save under the write lock. `f` decides whether the
    /// mutated copy is worth saving.
    fn modify<T>(
        &self,
        authority: &Authority,
        f: impl FnOnce(&mut Table) -> (T, bool),
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut table = self.load_table(authority)?;
        let (out, dirty) = f(&mut table);
        if dirty {
            self.save_table(authority, &table)?;
        }
        Ok(out)
    }
}

impl ContentStore for FileStore {
    fn query(&self, uri: &ContentUri, query: &Query) -> Result<RowCursor, StoreError> {
        let table = self.load_table(uri.authority())?;
        Ok(RowCursor::new(table.query(uri.id(), query)))
    }

    fn insert(&self, uri: &ContentUri, row: Row) -> Result<Option<ContentUri>, StoreError> {
        let now = now_seconds();
        let inserted = self.modify(uri.authority(), |table| {
            let result = match uri.id() {
                Some(id) => Err(Rejection::InsertIntoRow { id }),
                None => table.insert(row, now),
            };
            let dirty = result.is_ok();
            (result, dirty)
        })?;
        match inserted {
            Ok(id) => {
                let row_uri = uri.with_id(id);
                tracing::debug!("inserted {row_uri}");
                Ok(Some(row_uri))
            }
            Err(rejection) => {
                tracing::warn!("insert into {uri} declined: {rejection}");
                Ok(None)
            }
        }
    }

    fn update(&self, uri: &ContentUri, row: Row, selection: &Selection) -> Result<usize, StoreError> {
        let now = now_seconds();
        let updated = self.modify(uri.authority(), |table| {
            let result = table.update(uri.id(), row, selection, now);
            let dirty = matches!(result, Ok(n) if n > 0);
            (result, dirty)
        })?;
        Ok(updated?)
    }

    fn delete(&self, uri: &ContentUri, selection: &Selection) -> Result<usize, StoreError> {
        self.modify(uri.authority(), |table| {
            let removed = table.delete(uri.id(), selection);
            (removed, removed > 0)
        })
    }

    fn apply_batch(
        &self,
        authority: &Authority,
        operations: Vec<Operation>,
    ) -> Result<Vec<OperationResult>, BatchError> {
        let unavailable = |e: StoreError| BatchError::Unavailable(e.to_string());

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BatchError::Unavailable("store lock poisoned".to_string()))?;
        let table = self.load_table(authority).map_err(unavailable)?;
        let (committed, results) = batch::apply(&table, authority, &operations, now_seconds(), None)?;
        self.save_table(authority, &committed).map_err(unavailable)?;
        tracing::debug!("committed batch of {} against {authority}", results.len());
        Ok(results)
    }
}
