//! In-memory artwork table engine shared by every store.
//!
//! Constraints enforced here:
//! - `_id` is assigned from a monotonically increasing counter and never reused.
//! - A non-null `token` is unique: inserting an existing token merges the new
//!   values into that row and keeps its `_id`.
//! - A row's `token` is fixed at insert; updates that would change it are rejected.
//! - `_id`, `date_added` and `date_modified` are store-managed; caller values
//!   for them are ignored.
//! - `date_modified` moves only when a row's content actually changes.
//! - Unknown columns are rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use easel_core::{columns, ArtworkId, Row, Value};

use crate::error::Rejection;
use crate::query::{Query, Selection, SortOrder};

/// One provider's artwork table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTable")]
pub struct Table {
    /// Highest `_id` ever assigned.
    last_id: i64,
    rows: BTreeMap<i64, Row>,
}

/// On-disk form of a [`Table`]. The counter is raised to the highest stored
/// id on load, so a missing or stale `last_id` never hands out a used id.
#[derive(Deserialize)]
struct StoredTable {
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    rows: BTreeMap<i64, Row>,
}

impl From<StoredTable> for Table {
    fn from(stored: StoredTable) -> Self {
        let highest = stored.rows.keys().next_back().copied().unwrap_or(0);
        Self {
            last_id: stored.last_id.max(highest),
            rows: stored.rows,
        }
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: ArtworkId) -> Option<&Row> {
        self.rows.get(&id.0)
    }

    pub fn ids(&self) -> Vec<ArtworkId> {
        self.rows.keys().copied().map(ArtworkId).collect()
    }

    /// Rows matching `query`, optionally scoped to the single row `scope`.
    pub fn query(&self, scope: Option<ArtworkId>, query: &Query) -> Vec<Row> {
        let mut ids = self.select(scope, &query.selection);
        if query.order == SortOrder::IdDescending {
            ids.reverse();
        }
        if let Some(limit) = query.limit {
            ids.truncate(limit);
        }
        ids.into_iter()
            .filter_map(|id| self.rows.get(&id.0))
            .map(|row| match &query.projection {
                None => row.clone(),
                Some(wanted) => {
                    let mut projected = row.clone();
                    projected.retain(|column, _| wanted.iter().any(|w| w == column));
                    projected
                }
            })
            .collect()
    }

    /// Insert `row`, or merge it into the row already holding its token.
    pub fn insert(&mut self, row: Row, now: i64) -> Result<ArtworkId, Rejection> {
        let values = caller_values(row)?;
        let token = values
            .get(columns::TOKEN)
            .and_then(Value::as_text)
            .map(|t| t.into_owned());

        if let Some(existing) = token.and_then(|t| self.find_token(&t)) {
            if self.merge(existing, values, now) {
                tracing::debug!("token upsert updated row {existing}");
            } else {
                tracing::debug!("token upsert left row {existing} unchanged");
            }
            return Ok(existing);
        }

        self.last_id += 1;
        let id = self.last_id;
        let mut stored = values;
        stored.insert(columns::ID, id);
        stored.insert(columns::DATE_ADDED, now);
        stored.insert(columns::DATE_MODIFIED, now);
        self.rows.insert(id, stored);
        Ok(ArtworkId(id))
    }

    /// Merge `row` into every selected row. Returns the number of rows matched.
    ///
    /// Fails without touching any row if the update would change a token.
    pub fn update(
        &mut self,
        scope: Option<ArtworkId>,
        row: Row,
        selection: &Selection,
        now: i64,
    ) -> Result<usize, Rejection> {
        let values = caller_values(row)?;
        let ids = self.select(scope, selection);

        if let Some(token) = values.get(columns::TOKEN) {
            for id in &ids {
                let current = self.rows.get(&id.0).and_then(|r| r.get(columns::TOKEN));
                if !same_cell(current, token) {
                    return Err(Rejection::TokenImmutable { id: *id });
                }
            }
        }

        for id in &ids {
            self.merge(*id, values.clone(), now);
        }
        Ok(ids.len())
    }

    /// Delete every selected row. Returns the number of rows removed.
    pub fn delete(&mut self, scope: Option<ArtworkId>, selection: &Selection) -> usize {
        let ids = self.select(scope, selection);
        for id in &ids {
            self.rows.remove(&id.0);
        }
        ids.len()
    }

    fn select(&self, scope: Option<ArtworkId>, selection: &Selection) -> Vec<ArtworkId> {
        self.rows
            .iter()
            .map(|(id, row)| (ArtworkId(*id), row))
            .filter(|(id, _)| scope.map_or(true, |s| s == *id))
            .filter(|(id, row)| selection.matches(*id, row))
            .map(|(id, _)| id)
            .collect()
    }

    fn find_token(&self, token: &str) -> Option<ArtworkId> {
        let selection = Selection::Token(token.to_owned());
        self.select(None, &selection).into_iter().next()
    }

    /// Returns whether the row's content changed.
    fn merge(&mut self, id: ArtworkId, values: Row, now: i64) -> bool {
        let Some(row) = self.rows.get_mut(&id.0) else {
            return false;
        };
        let mut changed = false;
        for (column, value) in values {
            if !same_cell(row.get(&column), &value) {
                row.insert(column, value);
                changed = true;
            }
        }
        if changed {
            row.insert(columns::DATE_MODIFIED, now);
        }
        changed
    }
}

/// Validate a caller-supplied row and drop store-managed columns.
fn caller_values(mut row: Row) -> Result<Row, Rejection> {
    if let Some(unknown) = row.columns().find(|c| !columns::is_known(c)) {
        return Err(Rejection::UnknownColumn(unknown.to_owned()));
    }
    row.retain(|column, _| !columns::is_store_managed(column));
    Ok(row)
}

/// Absent and `NULL` compare equal.
fn same_cell(current: Option<&Value>, new: &Value) -> bool {
    match current {
        None => new.is_null(),
        Some(current) => current == new,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
