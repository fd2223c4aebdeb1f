//! Browser binding for the signal board.
//!
//! Boards live in a thread-local slab and are addressed by the handle
//! returned from [`load_board`]. Every function takes and returns JSON
//! strings; failures come back as `{"error": "..."}`.
//!
//! The binding never talks to the network. A committed move is returned to
//! the caller as a `commit` object, and the page issues the store writes
//! itself (status first, then the description when present).

use serde::Serialize;
use sigboard_board::views::{counts_by_risk, counts_by_state, map_markers, RiskTone};
use sigboard_board::{Board, Commit, FilterKind, MoveOutcome, MoveRequest, UnchangedReason};
use sigboard_storage::Record;
use slab::Slab;
use std::cell::RefCell;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use wasm_bindgen::prelude::*;

thread_local! {
    static BOARDS: RefCell<Slab<Board>> = const { RefCell::new(Slab::new()) };
}

fn error_json(msg: &str) -> String {
    serde_json::json!({ "error": msg }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => error_json(&format!("serialization error: {}", e)),
    }
}

fn with_board<F>(handle: u32, f: F) -> String
where
    F: FnOnce(&Board) -> String,
{
    BOARDS.with(|boards| {
        let boards = boards.borrow();
        match boards.get(handle as usize) {
            Some(board) => f(board),
            None => error_json(&format!("invalid board handle: {}", handle)),
        }
    })
}

fn with_board_mut<F>(handle: u32, f: F) -> String
where
    F: FnOnce(&mut Board) -> String,
{
    BOARDS.with(|boards| {
        let mut boards = boards.borrow_mut();
        match boards.get_mut(handle as usize) {
            Some(board) => f(board),
            None => error_json(&format!("invalid board handle: {}", handle)),
        }
    })
}

fn parse_records(records_json: &str) -> Result<Vec<Record>, String> {
    serde_json::from_str(records_json).map_err(|e| format!("invalid records JSON: {}", e))
}

/// Wire form of a [`MoveOutcome`].
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
enum OutcomeJson<'a> {
    Committed { commit: &'a Commit },
    #[serde(rename_all = "camelCase")]
    AwaitingAnnotation { destination_label: &'static str },
    Unchanged { reason: UnchangedReason },
}

fn outcome_json(board: &Board, outcome: &MoveOutcome) -> String {
    let wire = match outcome {
        MoveOutcome::Committed(commit) => OutcomeJson::Committed { commit },
        MoveOutcome::AwaitingAnnotation => OutcomeJson::AwaitingAnnotation {
            destination_label: board.pending_destination_label().unwrap_or_default(),
        },
        MoveOutcome::Unchanged(reason) => OutcomeJson::Unchanged { reason: *reason },
    };
    to_json(&wire)
}

fn view_json(board: &Board) -> String {
    serde_json::json!({
        "filter": board.filter(),
        "columns": board.filtered_columns().as_ref(),
    })
    .to_string()
}

// ──────────────────────────────────────────────
// Lifecycle
// ──────────────────────────────────────────────

/// Build a board from a JSON array of records.
#[wasm_bindgen]
pub fn load_board(records_json: &str) -> String {
    let records = match parse_records(records_json) {
        Ok(r) => r,
        Err(e) => return error_json(&e),
    };
    let handle = BOARDS.with(|boards| boards.borrow_mut().insert(Board::from_records(records)));
    serde_json::json!({ "handle": handle }).to_string()
}

/// Replace every record; filters and any pending move survive.
#[wasm_bindgen]
pub fn reload_board(handle: u32, records_json: &str) -> String {
    let records = match parse_records(records_json) {
        Ok(r) => r,
        Err(e) => return error_json(&e),
    };
    with_board_mut(handle, |board| {
        board.reload(records);
        view_json(board)
    })
}

#[wasm_bindgen]
pub fn free_board(handle: u32) {
    BOARDS.with(|boards| {
        let mut boards = boards.borrow_mut();
        if boards.contains(handle as usize) {
            boards.remove(handle as usize);
        }
    });
}

// ──────────────────────────────────────────────
// Views and filters
// ──────────────────────────────────────────────

/// The unfiltered columns.
#[wasm_bindgen]
pub fn board_columns(handle: u32) -> String {
    with_board(handle, |board| to_json(board.columns().as_ref()))
}

/// The columns as displayed, with the active filter.
#[wasm_bindgen]
pub fn filtered_columns(handle: u32) -> String {
    with_board(handle, view_json)
}

#[wasm_bindgen]
pub fn filter_candidates(handle: u32) -> String {
    with_board(handle, |board| to_json(board.filter_candidates()))
}

/// Set the `source` or `risk` filter. An empty value clears it.
#[wasm_bindgen]
pub fn set_filter(handle: u32, kind: &str, value: &str) -> String {
    let kind: FilterKind = match kind.parse() {
        Ok(k) => k,
        Err(e) => return error_json(&format!("{}", e)),
    };
    with_board_mut(handle, |board| {
        board.set_filter(kind, Some(value));
        view_json(board)
    })
}

#[wasm_bindgen]
pub fn clear_filters(handle: u32) -> String {
    with_board_mut(handle, |board| {
        board.clear_filters();
        view_json(board)
    })
}

// ──────────────────────────────────────────────
// Moves and the annotation gate
// ──────────────────────────────────────────────

/// Handle a drag-end event.
///
/// `request_json` is `{"recordId", "source", "sourceIndex", "destination",
/// "destinationIndex"}` in the coordinates of the displayed view.
#[wasm_bindgen]
pub fn propose_move(handle: u32, request_json: &str) -> String {
    let request: MoveRequest = match serde_json::from_str(request_json) {
        Ok(r) => r,
        Err(e) => return error_json(&format!("invalid move JSON: {}", e)),
    };
    with_board_mut(handle, |board| {
        let outcome = board.propose_move(request);
        outcome_json(board, &outcome)
    })
}

/// Confirm the pending move. `at` is the RFC 3339 time the operator
/// confirmed, as read from the browser clock.
#[wasm_bindgen]
pub fn confirm_annotation(handle: u32, text: &str, at: &str) -> String {
    let at = match OffsetDateTime::parse(at, &Rfc3339) {
        Ok(t) => t,
        Err(e) => return error_json(&format!("invalid timestamp '{}': {}", at, e)),
    };
    with_board_mut(handle, |board| match board.confirm_annotation_at(text, at) {
        Ok(outcome) => outcome_json(board, &outcome),
        Err(e) => error_json(&e.to_string()),
    })
}

#[wasm_bindgen]
pub fn cancel_annotation(handle: u32) -> String {
    with_board_mut(handle, |board| {
        let cancelled = board.cancel_annotation().is_some();
        serde_json::json!({ "cancelled": cancelled }).to_string()
    })
}

/// Store the annotation input and report whether confirm is enabled.
#[wasm_bindgen]
pub fn set_annotation_draft(handle: u32, text: &str) -> String {
    with_board_mut(handle, |board| {
        board.set_annotation_draft(text);
        serde_json::json!({ "canConfirm": board.can_confirm_annotation() }).to_string()
    })
}

#[wasm_bindgen]
pub fn gate_state(handle: u32) -> String {
    with_board(handle, |board| {
        serde_json::json!({
            "state": board.gate_state(),
            "pending": board.pending_move(),
            "destinationLabel": board.pending_destination_label(),
            "draft": board.annotation_draft(),
            "canConfirm": board.can_confirm_annotation(),
        })
        .to_string()
    })
}

// ──────────────────────────────────────────────
// Read-only views
// ──────────────────────────────────────────────

#[wasm_bindgen]
pub fn map_markers_json(handle: u32) -> String {
    with_board(handle, |board| to_json(&map_markers(board.columns())))
}

#[wasm_bindgen]
pub fn board_stats(handle: u32) -> String {
    with_board(handle, |board| {
        serde_json::json!({
            "byRisk": counts_by_risk(board.columns()),
            "byState": counts_by_state(board.columns()),
        })
        .to_string()
    })
}

/// `"high"`, `"medium"` or `"low"` for a free-text risk label.
#[wasm_bindgen]
pub fn risk_tone(risk_level: &str) -> String {
    let tone = RiskTone::of(Some(risk_level));
    serde_json::to_value(tone)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
