//! Batch plans and their transactional application.
//!
//! A batch is an ordered list of [`Operation`]s against one authority. Later
//! operations may consume the result of an earlier one through a typed
//! [`BackReference`]; the canonical use is "insert a row, then delete every
//! row except the one just inserted".
//!
//! [`apply`] runs the whole plan against a scratch copy of the table and hands
//! the copy back only if every operation succeeded. Stores commit that copy in
//! one step, so a failed batch never leaves a partial result behind.

use thiserror::Error;

use easel_core::{ArtworkId, Authority, ContentUri, Row};

use crate::query::Selection;
use crate::table::Table;

/// Position of an earlier operation in the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackReference(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert {
        uri: ContentUri,
        row: Row,
    },
    Update {
        uri: ContentUri,
        row: Row,
        selection: Selection,
    },
    Delete {
        uri: ContentUri,
        selection: Selection,
    },
    /// Delete every row except the one produced by operation `keep`.
    DeleteExcept {
        uri: ContentUri,
        keep: BackReference,
    },
}

impl Operation {
    pub fn uri(&self) -> &ContentUri {
        match self {
            Operation::Insert { uri, .. }
            | Operation::Update { uri, .. }
            | Operation::Delete { uri, .. }
            | Operation::DeleteExcept { uri, .. } => uri,
        }
    }

    pub fn back_reference(&self) -> Option<BackReference> {
        match self {
            Operation::DeleteExcept { keep, .. } => Some(*keep),
            _ => None,
        }
    }

    /// Whether a successful result of this operation names a row.
    pub fn yields_row(&self) -> bool {
        matches!(self, Operation::Insert { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
            Operation::DeleteExcept { .. } => "delete-except",
        }
    }
}

/// Outcome of one applied operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Address of the inserted (or token-updated) row.
    Inserted(ContentUri),
    /// Number of rows an update or delete touched.
    Affected(usize),
}

impl OperationResult {
    pub fn uri(&self) -> Option<&ContentUri> {
        match self {
            OperationResult::Inserted(uri) => Some(uri),
            OperationResult::Affected(_) => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            OperationResult::Inserted(_) => None,
            OperationResult::Affected(n) => Some(*n),
        }
    }
}

/// Why a batch was not applied. In both cases nothing was applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The store refused an operation.
    #[error("batch operation {index} rejected: {reason}")]
    Rejected { index: usize, reason: String },

    /// The store could not be reached or could not commit.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One-shot failure a test store can be told to produce on its next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail with [`BatchError::Unavailable`] once operation `n` has been applied.
    DropConnectionAfter(usize),
    /// Fail with [`BatchError::Rejected`] in place of operation `n`.
    RejectAt(usize),
}

/// Apply `operations` to a copy of `table`.
///
/// Returns the updated copy and one result per operation, or the first
/// failure. `table` itself is never modified.
pub fn apply(
    table: &Table,
    authority: &Authority,
    operations: &[Operation],
    now: i64,
    fault: Option<Fault>,
) -> Result<(Table, Vec<OperationResult>), BatchError> {
    let mut scratch = table.clone();
    let mut results: Vec<OperationResult> = Vec::with_capacity(operations.len());

    for (index, op) in operations.iter().enumerate() {
        let reject = |reason: String| BatchError::Rejected { index, reason };

        if fault == Some(Fault::RejectAt(index)) {
            return Err(reject("injected rejection".to_string()));
        }
        let uri = op.uri();
        if uri.authority() != authority {
            return Err(reject(format!(
                "{} targets {}, batch is for {authority}",
                op.kind(),
                uri.authority()
            )));
        }

        let scope = uri.id();
        let result = match op {
            Operation::Insert { row, .. } => {
                if let Some(id) = scope {
                    return Err(reject(format!("insert must target the collection, not row {id}")));
                }
                let id = scratch
                    .insert(row.clone(), now)
                    .map_err(|r| reject(r.to_string()))?;
                OperationResult::Inserted(uri.with_id(id))
            }
            Operation::Update { row, selection, .. } => OperationResult::Affected(
                scratch
                    .update(scope, row.clone(), selection, now)
                    .map_err(|r| reject(r.to_string()))?,
            ),
            Operation::Delete { selection, .. } => {
                OperationResult::Affected(scratch.delete(scope, selection))
            }
            Operation::DeleteExcept { keep, .. } => {
                let id = resolve(&results, *keep).map_err(reject)?;
                OperationResult::Affected(scratch.delete(scope, &Selection::IdNot(id)))
            }
        };
        tracing::debug!("batch op {index} ({}) -> {result:?}", op.kind());
        results.push(result);

        if fault == Some(Fault::DropConnectionAfter(index)) {
            return Err(BatchError::Unavailable(format!(
                "connection dropped after operation {index}"
            )));
        }
    }

    Ok((scratch, results))
}

/// Row id produced by the operation `reference` points at.
fn resolve(results: &[OperationResult], reference: BackReference) -> Result<ArtworkId, String> {
    let BackReference(target) = reference;
    match results.get(target) {
        None => Err(format!("back-reference to operation {target}, which has not run")),
        Some(result) => result
            .uri()
            .and_then(ContentUri::id)
            .ok_or_else(|| format!("back-reference to operation {target}, which produced no row")),
    }
}
