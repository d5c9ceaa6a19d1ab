//! Executing fill actions against a row store.
//!
//! The engine never talks to the network: persistence goes through the
//! [`RowStore`] seam, one save call per affected row. Batches are
//! modeled as per-row results so the caller decides how to report
//! partial failure; rows already written stay written.

use std::fmt;

use crate::fill::FillAction;
use crate::row::EntityRow;

/// Failure saving a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub entity_id: String,
    pub message: String,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity_id, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Persistence seam for entity rows. Implemented by the API client;
/// tests substitute an in-memory store.
pub trait RowStore {
    fn save_row(&self, row: &EntityRow) -> Result<EntityRow, StoreError>;
}

/// Write each row through the store, collecting per-row results.
/// Writes target disjoint entity ids, so ordering between them carries
/// no meaning; there is no retry and no rollback of landed writes.
pub fn run_writes(
    store: &dyn RowStore,
    writes: &[EntityRow],
) -> Vec<Result<EntityRow, StoreError>> {
    writes.iter().map(|row| store.save_row(row)).collect()
}

/// Result of running one action: the rows the server accepted and the
/// per-row failures left for the caller to aggregate.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub applied: Vec<EntityRow>,
    pub errors: Vec<StoreError>,
}

impl ActionOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Single aggregated message for the notification surface, or None
    /// when every row saved.
    pub fn error_summary(&self) -> Option<String> {
        let first = self.errors.first()?;
        if self.errors.len() == 1 {
            Some(format!("1 row failed to save: {}", first.message))
        } else {
            Some(format!(
                "{} rows failed to save: {}",
                self.errors.len(),
                first.message
            ))
        }
    }
}

/// Run `action` against `store` and splice every saved row back into
/// `rows` by entity id.
///
/// With `revert_first`, the action's captured backup is re-saved before
/// its own writes — used when the user picks an alternate action from
/// the same menu, restoring the pre-action state first. Only one level
/// of undo exists: each new destructive action discards the previous
/// one's backup except through its own generated Revert.
pub fn apply_action(
    store: &dyn RowStore,
    action: &FillAction,
    rows: &mut Vec<EntityRow>,
    revert_first: bool,
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();

    if revert_first {
        if let Some(backup) = &action.revert {
            collect(run_writes(store, backup), &mut outcome);
        }
    }
    collect(run_writes(store, &action.writes), &mut outcome);

    splice_rows(rows, &outcome.applied);
    outcome
}

/// Replace rows in place by entity id. Rows the grid no longer holds
/// are dropped silently.
pub fn splice_rows(rows: &mut [EntityRow], updated: &[EntityRow]) {
    for new_row in updated {
        if let Some(slot) = rows.iter_mut().find(|r| r.entity_id == new_row.entity_id) {
            *slot = new_row.clone();
        }
    }
}

fn collect(results: Vec<Result<EntityRow, StoreError>>, outcome: &mut ActionOutcome) {
    for result in results {
        match result {
            Ok(row) => outcome.applied.push(row),
            Err(err) => outcome.errors.push(err),
        }
    }
}
