//! Transition engine: applies a drag-end move to the master columns.
//!
//! A move is expressed in the coordinates of the view the operator dragged
//! in, which may be the filtered projection. Indices in that view do not line
//! up with the master columns, so:
//!
//! 1. the record is located by identity inside the master source column,
//! 2. it is removed there and re-created with its new status,
//! 3. it is inserted at the requested index only when the dragged view *was*
//!    the master view; under an active filter it is appended instead.
//!
//! The engine is a pure function of its inputs and never fails: anything it
//! cannot apply comes back as [`Transition::Unchanged`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sigboard_storage::{Record, RecordId};

use crate::columns::Columns;
use crate::gate::Annotation;
use crate::workflow::WorkflowState;

/// A drag-end event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub record_id: RecordId,
    pub source: WorkflowState,
    pub destination: WorkflowState,
    /// Index in the source column of the view the drag started in.
    pub source_index: usize,
    /// Requested index in the destination column of that same view.
    pub destination_index: usize,
}

impl MoveRequest {
    pub fn new(
        record_id: impl Into<RecordId>,
        source: WorkflowState,
        source_index: usize,
        destination: WorkflowState,
        destination_index: usize,
    ) -> Self {
        MoveRequest {
            record_id: record_id.into(),
            source,
            destination,
            source_index,
            destination_index,
        }
    }

    /// Dropped back where it started.
    pub fn is_noop(&self) -> bool {
        self.source == self.destination && self.source_index == self.destination_index
    }
}

/// Where the moved record lands in its destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Exact positional drop; the index is clamped to the column length.
    At(usize),
    /// End of the column.
    Append,
}

impl Placement {
    /// Placement for a drop at `requested` in a view that is filtered or not.
    ///
    /// Adjacent cards in a filtered view are not adjacent in the master
    /// column, so a filtered drop only decides the column, never the slot.
    pub fn for_view(filter_active: bool, requested: usize) -> Self {
        if filter_active {
            Placement::Append
        } else {
            Placement::At(requested)
        }
    }
}

/// Why a move left the board untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnchangedReason {
    /// Source and destination are the same column and index.
    SamePosition,
    /// The record is not in the claimed source column of the master state.
    StaleReference,
    /// An annotation prompt is open; moves wait until it closes.
    GateBusy,
}

impl fmt::Display for UnchangedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnchangedReason::SamePosition => f.write_str("record is already at that position"),
            UnchangedReason::StaleReference => {
                f.write_str("record is no longer in the column it was dragged from")
            }
            UnchangedReason::GateBusy => f.write_str("another move is awaiting annotation"),
        }
    }
}

/// A move that was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The new master columns.
    pub columns: Columns,
    /// The moved record, as it now stands.
    pub record: Arc<Record>,
    pub from: WorkflowState,
    pub to: WorkflowState,
    /// Final index of the record in its destination column.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied(Applied),
    Unchanged(UnchangedReason),
}

/// Apply `request` to `master`.
///
/// When `annotation` is given its block is appended to the record's
/// description as part of the same change.
pub fn apply_move(
    master: &Columns,
    request: &MoveRequest,
    placement: Placement,
    annotation: Option<&Annotation>,
) -> Transition {
    if request.is_noop() {
        tracing::debug!(record_id = %request.record_id, "move dropped at its origin, ignoring");
        return Transition::Unchanged(UnchangedReason::SamePosition);
    }

    let master_index = match master
        .column(request.source)
        .position_of(&request.record_id)
    {
        Some(index) => index,
        None => {
            tracing::debug!(
                record_id = %request.record_id,
                source = %request.source,
                "record not in claimed source column, ignoring stale move"
            );
            return Transition::Unchanged(UnchangedReason::StaleReference);
        }
    };

    if master_index != request.source_index {
        tracing::trace!(
            record_id = %request.record_id,
            view_index = request.source_index,
            master_index,
            "view index differs from master index"
        );
    }

    let mut columns = master.clone();
    let original = columns.column_mut(request.source).remove(master_index);

    let mut updated = Record::clone(&original);
    updated.status = request.destination.id().to_string();
    if let Some(annotation) = annotation {
        updated.description = Some(annotation.append_to(updated.description.as_deref()));
    }
    let updated = Arc::new(updated);

    let destination = columns.column_mut(request.destination);
    let index = match placement {
        Placement::At(requested) => requested.min(destination.len()),
        Placement::Append => destination.len(),
    };
    destination.insert(index, Arc::clone(&updated));

    tracing::info!(
        record_id = %request.record_id,
        from = %request.source,
        to = %request.destination,
        index,
        "record moved"
    );

    Transition::Applied(Applied {
        columns,
        record: updated,
        from: request.source,
        to: request.destination,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::partition;
    use WorkflowState::*;

    fn ids(columns: &Columns, state: WorkflowState) -> Vec<String> {
        columns
            .column(state)
            .records()
            .iter()
            .map(|r| r.id.to_string())
            .collect()
    }

    fn applied(t: Transition) -> Applied {
        match t {
            Transition::Applied(a) => a,
            Transition::Unchanged(reason) => panic!("expected applied move, got {:?}", reason),
        }
    }

    #[test]
    fn cross_column_exact_insert() {
        let master = partition(vec![
            Record::new("a", "A", "intake"),
            Record::new("b", "B", "analysis"),
            Record::new("c", "C", "analysis"),
        ]);
        let req = MoveRequest::new("a", Intake, 0, Analysis, 1);
        let result = applied(apply_move(&master, &req, Placement::At(1), None));

        assert_eq!(ids(&result.columns, Analysis), vec!["b", "a", "c"]);
        assert!(result.columns.column(Intake).is_empty());
        assert_eq!(result.record.status, "analysis");
        assert_eq!(result.index, 1);
    }

    #[test]
    fn reorder_within_column() {
        let master = partition(vec![
            Record::new("a", "A", "monitoring"),
            Record::new("b", "B", "monitoring"),
            Record::new("c", "C", "monitoring"),
        ]);
        let req = MoveRequest::new("a", Monitoring, 0, Monitoring, 2);
        let result = applied(apply_move(&master, &req, Placement::At(2), None));
        assert_eq!(ids(&result.columns, Monitoring), vec!["b", "c", "a"]);
        assert_eq!(result.columns.total(), 3);
    }

    #[test]
    fn same_column_same_index_is_noop() {
        let master = partition(vec![Record::new("a", "A", "intake")]);
        let req = MoveRequest::new("a", Intake, 0, Intake, 0);
        assert_eq!(
            apply_move(&master, &req, Placement::At(0), None),
            Transition::Unchanged(UnchangedReason::SamePosition)
        );
    }

    #[test]
    fn stale_reference_leaves_state_unchanged() {
        let master = partition(vec![Record::new("a", "A", "analysis")]);
        let req = MoveRequest::new("a", Intake, 0, Monitoring, 0);
        assert_eq!(
            apply_move(&master, &req, Placement::At(0), None),
            Transition::Unchanged(UnchangedReason::StaleReference)
        );
    }

    #[test]
    fn append_ignores_requested_index() {
        let master = partition(vec![
            Record::new("a", "A", "intake"),
            Record::new("m1", "M1", "monitoring"),
            Record::new("m2", "M2", "monitoring"),
        ]);
        let req = MoveRequest::new("a", Intake, 0, Monitoring, 0);
        let result = applied(apply_move(&master, &req, Placement::Append, None));
        assert_eq!(ids(&result.columns, Monitoring), vec!["m1", "m2", "a"]);
        assert_eq!(result.index, 2);
    }

    #[test]
    fn out_of_range_index_is_clamped() {
        let master = partition(vec![Record::new("a", "A", "intake")]);
        let req = MoveRequest::new("a", Intake, 0, Discarded, 99);
        let result = applied(apply_move(&master, &req, Placement::At(99), None));
        assert_eq!(ids(&result.columns, Discarded), vec!["a"]);
        assert_eq!(result.index, 0);
    }

    #[test]
    fn original_columns_and_record_are_not_mutated() {
        let master = partition(vec![Record::new("a", "A", "intake")]);
        let before = master.clone();
        let held = Arc::clone(&master.column(Intake).records()[0]);

        let req = MoveRequest::new("a", Intake, 0, Analysis, 0);
        let _ = apply_move(&master, &req, Placement::At(0), None);

        assert_eq!(master, before);
        assert_eq!(held.status, "intake");
    }

    #[test]
    fn fallback_record_gets_a_real_status_when_moved() {
        let master = partition(vec![Record::new("a", "A", "legacy-status")]);
        let req = MoveRequest::new("a", Intake, 0, Analysis, 0);
        let result = applied(apply_move(&master, &req, Placement::At(0), None));
        assert_eq!(result.record.status, "analysis");
    }

    #[test]
    fn placement_for_view() {
        assert_eq!(Placement::for_view(false, 3), Placement::At(3));
        assert_eq!(Placement::for_view(true, 3), Placement::Append);
    }
}
