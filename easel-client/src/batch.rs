//! Plan validation and submission for multi-operation batches.

use easel_core::Authority;
use easel_store::{ContentStore, Operation, OperationResult};

use crate::error::BatchFailure;

/// Submits batch plans to a store as one transaction.
///
/// The plan is checked before submission: every operation must target the
/// batch's authority and every back-reference must point at an earlier
/// operation that produces a row address. A store that reports success with
/// the wrong number or shape of results is treated as a failure.
#[derive(Debug)]
pub struct BatchExecutor<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ContentStore + ?Sized> BatchExecutor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Apply `operations` against `authority`, all or nothing.
    ///
    /// On success there is one result per operation, in plan order.
    pub fn execute(
        &self,
        authority: &Authority,
        operations: Vec<Operation>,
    ) -> Result<Vec<OperationResult>, BatchFailure> {
        validate(authority, &operations)?;

        let yields_row: Vec<bool> = operations.iter().map(Operation::yields_row).collect();
        tracing::debug!(
            "submitting batch of {} operations to {authority}",
            operations.len()
        );

        let results = self
            .store
            .apply_batch(authority, operations)
            .map_err(BatchFailure::from)?;

        let usable = results
            .iter()
            .zip(&yields_row)
            .take_while(|(result, yields)| !**yields || result.uri().is_some())
            .count();
        if results.len() != yields_row.len() || usable != yields_row.len() {
            return Err(BatchFailure::MissingResults {
                expected: yields_row.len(),
                got: usable,
            });
        }
        Ok(results)
    }
}

/// Check a plan without touching the store.
pub fn validate(authority: &Authority, operations: &[Operation]) -> Result<(), BatchFailure> {
    if operations.is_empty() {
        return Err(BatchFailure::InvalidPlan("batch has no operations".to_string()));
    }
    for (index, op) in operations.iter().enumerate() {
        let target = op.uri().authority();
        if target != authority {
            return Err(BatchFailure::InvalidPlan(format!(
                "operation {index} ({}) targets {target}, batch is for {authority}",
                op.kind()
            )));
        }
        if let Some(reference) = op.back_reference() {
            let source = reference.0;
            if source >= index {
                return Err(BatchFailure::InvalidPlan(format!(
                    "operation {index} refers to operation {source}, which does not run before it"
                )));
            }
            if !operations[source].yields_row() {
                return Err(BatchFailure::InvalidPlan(format!(
                    "operation {index} refers to operation {source} ({}), which yields no row",
                    operations[source].kind()
                )));
            }
        }
    }
    Ok(())
}
