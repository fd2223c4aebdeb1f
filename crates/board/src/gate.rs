//! Annotation gate for entry into `confirmed-event`.
//!
//! Two states: `Idle` and `AwaitingAnnotation`. A gated move is held as a
//! [`PendingMove`] until the operator either confirms it with a non-blank
//! justification or cancels it. Cancelling needs no undo: the master columns
//! were never touched.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::transition::MoveRequest;
use crate::workflow::WorkflowState;

/// Marker lines delimiting an annotation block inside a description.
pub const NOTE_OPEN: &str = "--- Confirmation note";
pub const NOTE_CLOSE: &str = "--- End of note ---";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Confirm was attempted with empty or whitespace-only text.
    #[error("annotation text must not be blank")]
    BlankAnnotation,
    /// Confirm or cancel was attempted with no move awaiting annotation.
    #[error("no move is awaiting annotation")]
    NoPendingMove,
    /// A second gated move arrived while one is already pending.
    #[error("a move is already awaiting annotation")]
    Busy,
}

/// An operator's justification for a gated transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    text: String,
    at: OffsetDateTime,
}

impl Annotation {
    /// Trimmed `text` stamped with `at`. Blank text is rejected.
    pub fn new(text: &str, at: OffsetDateTime) -> Result<Self, GateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GateError::BlankAnnotation);
        }
        Ok(Annotation {
            text: text.to_string(),
            at,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The delimited block appended to a description.
    pub fn block(&self) -> String {
        let stamp = self
            .at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        format!("{NOTE_OPEN} ({stamp}) ---\n{}\n{NOTE_CLOSE}", self.text)
    }

    /// `description` with this annotation's block appended after a blank line.
    pub fn append_to(&self, description: Option<&str>) -> String {
        match description {
            Some(existing) if !existing.is_empty() => {
                format!("{}\n\n{}", existing.trim_end(), self.block())
            }
            _ => self.block(),
        }
    }
}

/// A gated move waiting for its annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMove {
    #[serde(flatten)]
    pub request: MoveRequest,
}

impl PendingMove {
    /// Label of the column the move is headed for, for the prompt title.
    pub fn destination_label(&self) -> &'static str {
        self.request.destination.display_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateState {
    Idle,
    AwaitingAnnotation,
}

/// The gate state machine. Holds a pending move if and only if it is
/// awaiting an annotation.
#[derive(Debug, Clone, Default)]
pub struct AnnotationGate {
    pending: Option<PendingMove>,
    draft: String,
}

impl AnnotationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `request` must pass through the gate.
    pub fn intercepts(request: &MoveRequest) -> bool {
        WorkflowState::requires_annotation(request.source, request.destination)
    }

    pub fn state(&self) -> GateState {
        if self.pending.is_some() {
            GateState::AwaitingAnnotation
        } else {
            GateState::Idle
        }
    }

    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    /// Current content of the annotation input.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Whether `text` would be accepted by [`AnnotationGate::confirm`].
    pub fn can_confirm(&self, text: &str) -> bool {
        self.pending.is_some() && !text.trim().is_empty()
    }

    /// `Idle` → `AwaitingAnnotation`, capturing `request` and clearing the
    /// annotation input.
    pub fn hold(&mut self, request: MoveRequest) -> Result<&PendingMove, GateError> {
        if self.pending.is_some() {
            return Err(GateError::Busy);
        }
        self.draft.clear();
        tracing::debug!(
            record_id = %request.record_id,
            destination = %request.destination,
            "move held for annotation"
        );
        Ok(&*self.pending.insert(PendingMove { request }))
    }

    /// `AwaitingAnnotation` → `Idle` with an accepted annotation.
    ///
    /// On a blank `text` the gate stays awaiting and keeps its pending move.
    pub fn confirm(
        &mut self,
        text: &str,
        at: OffsetDateTime,
    ) -> Result<(PendingMove, Annotation), GateError> {
        if self.pending.is_none() {
            return Err(GateError::NoPendingMove);
        }
        let annotation = Annotation::new(text, at)?;
        let pending = self.pending.take().ok_or(GateError::NoPendingMove)?;
        self.draft.clear();
        Ok((pending, annotation))
    }

    /// `AwaitingAnnotation` → `Idle`, discarding the pending move.
    pub fn cancel(&mut self) -> Option<PendingMove> {
        self.draft.clear();
        let discarded = self.pending.take();
        if let Some(p) = &discarded {
            tracing::debug!(record_id = %p.request.record_id, "pending move cancelled");
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use WorkflowState::*;

    fn gated() -> MoveRequest {
        MoveRequest::new("c", Monitoring, 0, ConfirmedEvent, 0)
    }

    #[test]
    fn intercepts_only_entry_into_confirmed_event() {
        assert!(AnnotationGate::intercepts(&gated()));
        assert!(!AnnotationGate::intercepts(&MoveRequest::new(
            "c",
            ConfirmedEvent,
            0,
            ConfirmedEvent,
            1
        )));
        assert!(!AnnotationGate::intercepts(&MoveRequest::new(
            "c", Monitoring, 0, Discarded, 0
        )));
    }

    #[test]
    fn hold_then_cancel_returns_to_idle() {
        let mut gate = AnnotationGate::new();
        gate.set_draft("leftover");
        gate.hold(gated()).unwrap();
        assert_eq!(gate.state(), GateState::AwaitingAnnotation);
        assert_eq!(gate.draft(), "");
        assert_eq!(
            gate.pending().map(PendingMove::destination_label),
            Some("Confirmed Events")
        );

        let discarded = gate.cancel().unwrap();
        assert_eq!(discarded.request, gated());
        assert_eq!(gate.state(), GateState::Idle);
        assert!(gate.pending().is_none());
    }

    #[test]
    fn blank_confirm_keeps_pending_move() {
        let mut gate = AnnotationGate::new();
        gate.hold(gated()).unwrap();
        let at = datetime!(2026-03-01 10:00 UTC);

        assert_eq!(gate.confirm("   \n", at), Err(GateError::BlankAnnotation));
        assert_eq!(gate.state(), GateState::AwaitingAnnotation);
        assert!(!gate.can_confirm(""));
        assert!(gate.can_confirm("ok"));
    }

    #[test]
    fn confirm_releases_pending_move_with_annotation() {
        let mut gate = AnnotationGate::new();
        gate.hold(gated()).unwrap();
        let at = datetime!(2026-03-01 10:00 UTC);

        let (pending, annotation) = gate.confirm("  Isolation protocol activated ", at).unwrap();
        assert_eq!(pending.request, gated());
        assert_eq!(annotation.text(), "Isolation protocol activated");
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn confirm_and_cancel_without_pending() {
        let mut gate = AnnotationGate::new();
        let at = datetime!(2026-03-01 10:00 UTC);
        assert_eq!(gate.confirm("text", at), Err(GateError::NoPendingMove));
        assert!(gate.cancel().is_none());
    }

    #[test]
    fn second_hold_is_refused() {
        let mut gate = AnnotationGate::new();
        gate.hold(gated()).unwrap();
        assert_eq!(
            gate.hold(MoveRequest::new("d", Intake, 0, ConfirmedEvent, 0))
                .unwrap_err(),
            GateError::Busy
        );
        assert_eq!(gate.pending().unwrap().request.record_id.as_str(), "c");
    }

    #[test]
    fn annotation_block_is_delimited_and_timestamped() {
        let at = datetime!(2026-03-01 10:30:00 UTC);
        let annotation = Annotation::new("Lab confirmed", at).unwrap();

        let appended = annotation.append_to(Some("Cluster of fever cases."));
        assert!(appended.starts_with("Cluster of fever cases.\n\n"));
        assert!(appended.contains("--- Confirmation note (2026-03-01T10:30:00Z) ---"));
        assert!(appended.contains("\nLab confirmed\n"));
        assert!(appended.ends_with(NOTE_CLOSE));

        assert_eq!(annotation.append_to(None), annotation.block());
        assert_eq!(annotation.append_to(Some("")), annotation.block());
    }
}
