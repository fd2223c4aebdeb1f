//! The board: master columns, filters, the derived view and the annotation
//! gate, behind the entry points a presentation layer calls.
//!
//! All mutation happens synchronously inside these methods, one UI event at a
//! time. The only asynchronous step, writing to the store, is left to the
//! caller through the [`Commit`] returned by a successful move (see
//! [`crate::sync`]).

use std::sync::Arc;

use sigboard_storage::{Record, RecordId, RecordStore};
use time::OffsetDateTime;

use crate::columns::{partition, Columns};
use crate::filter::{FilterCandidates, FilterKind, FilterSet, ViewCache};
use crate::gate::{Annotation, AnnotationGate, GateError, GateState, PendingMove};
use crate::sync::Commit;
use crate::transition::{apply_move, MoveRequest, Placement, Transition, UnchangedReason};
use crate::workflow::WorkflowState;

/// Result of proposing a move or confirming an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The master columns changed; the commit must be sent to the store.
    Committed(Commit),
    /// The move is held by the annotation gate; nothing changed yet.
    AwaitingAnnotation,
    /// Nothing changed.
    Unchanged(UnchangedReason),
}

impl MoveOutcome {
    pub fn commit(&self) -> Option<&Commit> {
        match self {
            MoveOutcome::Committed(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    master: Arc<Columns>,
    filter: FilterSet,
    cache: ViewCache,
    gate: AnnotationGate,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board with five empty columns.
    pub fn new() -> Self {
        Self::with_columns(Columns::empty())
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self::with_columns(partition(records))
    }

    fn with_columns(columns: Columns) -> Self {
        let master = Arc::new(columns);
        Board {
            cache: ViewCache::new(&master),
            master,
            filter: FilterSet::default(),
            gate: AnnotationGate::new(),
        }
    }

    /// Fetch the full record list and build a board from it.
    ///
    /// A failed fetch yields an empty board; the failure is only logged.
    pub async fn load(store: &dyn RecordStore) -> Self {
        match store.list_records().await {
            Ok(records) => {
                tracing::info!(count = records.len(), "board loaded");
                Self::from_records(records)
            }
            Err(error) => {
                tracing::warn!(%error, "failed to load records, showing an empty board");
                Self::new()
            }
        }
    }

    /// Replace every record with a fresh snapshot. Filters are kept; a
    /// pending move stays pending and is re-validated on confirm.
    pub fn reload(&mut self, records: Vec<Record>) {
        self.replace_master(partition(records));
    }

    fn replace_master(&mut self, columns: Columns) {
        self.master = Arc::new(columns);
        self.cache.refresh(&self.master, &self.filter);
    }

    /// The authoritative, unfiltered columns.
    pub fn columns(&self) -> &Arc<Columns> {
        &self.master
    }

    /// The columns as currently displayed. Identical (same `Arc`) to
    /// [`Board::columns`] while no filter is active.
    pub fn filtered_columns(&self) -> &Arc<Columns> {
        self.cache.view()
    }

    pub fn filter(&self) -> &FilterSet {
        &self.filter
    }

    pub fn filter_candidates(&self) -> &FilterCandidates {
        self.cache.candidates()
    }

    /// Set (or, with `None` or a blank value, clear) one filter predicate.
    pub fn set_filter(&mut self, kind: FilterKind, value: Option<&str>) {
        self.filter.set(kind, value);
        self.cache.refresh(&self.master, &self.filter);
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.cache.refresh(&self.master, &self.filter);
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn pending_move(&self) -> Option<&PendingMove> {
        self.gate.pending()
    }

    pub fn pending_destination_label(&self) -> Option<&'static str> {
        self.gate.pending().map(PendingMove::destination_label)
    }

    pub fn annotation_draft(&self) -> &str {
        self.gate.draft()
    }

    pub fn set_annotation_draft(&mut self, text: &str) {
        self.gate.set_draft(text);
    }

    /// Whether the confirm action should be enabled for the current draft.
    pub fn can_confirm_annotation(&self) -> bool {
        self.gate.can_confirm(self.gate.draft())
    }

    /// Locate a record in the master columns.
    pub fn find(&self, id: &RecordId) -> Option<(WorkflowState, usize, &Arc<Record>)> {
        self.master.find(id)
    }

    /// Handle a drag-end event from the displayed view.
    ///
    /// Gated moves are held and report [`MoveOutcome::AwaitingAnnotation`];
    /// all others are applied immediately.
    pub fn propose_move(&mut self, request: MoveRequest) -> MoveOutcome {
        if self.gate.state() == GateState::AwaitingAnnotation {
            tracing::debug!(record_id = %request.record_id, "move refused while annotation is pending");
            return MoveOutcome::Unchanged(UnchangedReason::GateBusy);
        }
        if request.is_noop() {
            return MoveOutcome::Unchanged(UnchangedReason::SamePosition);
        }
        if AnnotationGate::intercepts(&request) {
            if self
                .master
                .column(request.source)
                .position_of(&request.record_id)
                .is_none()
            {
                tracing::debug!(record_id = %request.record_id, "stale gated move ignored");
                return MoveOutcome::Unchanged(UnchangedReason::StaleReference);
            }
            return match self.gate.hold(request) {
                Ok(_) => MoveOutcome::AwaitingAnnotation,
                Err(_) => MoveOutcome::Unchanged(UnchangedReason::GateBusy),
            };
        }
        self.commit(&request, None)
    }

    /// Confirm the pending move with `text`, stamped with the current time.
    pub fn confirm_annotation(&mut self, text: &str) -> Result<MoveOutcome, GateError> {
        self.confirm_annotation_at(text, OffsetDateTime::now_utc())
    }

    /// Confirm the pending move with `text`, stamped with `at`.
    ///
    /// A blank `text` is rejected and the move stays pending.
    pub fn confirm_annotation_at(
        &mut self,
        text: &str,
        at: OffsetDateTime,
    ) -> Result<MoveOutcome, GateError> {
        let (pending, annotation) = self.gate.confirm(text, at)?;
        Ok(self.commit(&pending.request, Some(&annotation)))
    }

    /// Discard the pending move. The master columns are untouched.
    pub fn cancel_annotation(&mut self) -> Option<PendingMove> {
        self.gate.cancel()
    }

    fn commit(&mut self, request: &MoveRequest, annotation: Option<&Annotation>) -> MoveOutcome {
        let placement = Placement::for_view(self.filter.is_active(), request.destination_index);
        match apply_move(&self.master, request, placement, annotation) {
            Transition::Applied(applied) => {
                let commit = Commit {
                    record_id: applied.record.id.clone(),
                    status: applied.to,
                    description: annotation.and_then(|_| applied.record.description.clone()),
                };
                self.replace_master(applied.columns);
                MoveOutcome::Committed(commit)
            }
            Transition::Unchanged(reason) => MoveOutcome::Unchanged(reason),
        }
    }
}
