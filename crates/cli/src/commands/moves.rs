//! `sigboard move`: one drag-and-drop, from the command line.
//!
//! The record is located on the board as displayed with the given filters,
//! the move goes through the same gate and transition engine a UI uses, and
//! the resulting commit is written to the store before the command returns.

use std::sync::Arc;

use sigboard_board::{
    Board, Commit, GateError, MoveOutcome, MoveRequest, OperatorNotifier, PersistenceSync,
    RecordId, StoreError, SyncOutcome, WorkflowState,
};

use super::{load_board, print_json, Context};
use crate::{report_error, FilterArgs, OutputFormat};

pub(crate) struct MoveArgs<'a> {
    pub id: &'a str,
    pub to: WorkflowState,
    pub position: Option<usize>,
    pub note: Option<&'a str>,
    pub filter: &'a FilterArgs,
}

/// Prints failed saves straight to the operator.
struct CliNotifier {
    output: OutputFormat,
    quiet: bool,
}

impl OperatorNotifier for CliNotifier {
    fn sync_failed(&self, commit: &Commit, error: &StoreError) {
        let mut msg = format!(
            "failed to save move of '{}' to '{}': {}",
            commit.record_id, commit.status, error
        );
        if matches!(error, StoreError::Unauthorized) {
            msg.push_str(" (session expired, log in again)");
        }
        report_error(&msg, self.output, self.quiet);
    }
}

pub(crate) async fn cmd_move(ctx: &Context, args: MoveArgs<'_>) {
    let mut board = load_board(ctx, args.filter).await;
    let request = match build_request(&board, &args) {
        Ok(request) => request,
        Err(msg) => ctx.fail(&msg),
    };

    let outcome = match board.propose_move(request) {
        MoveOutcome::AwaitingAnnotation => match confirm(&mut board, args.note) {
            Ok(outcome) => outcome,
            Err(msg) => ctx.fail(&msg),
        },
        outcome => {
            if args.note.is_some() {
                tracing::warn!(
                    to = %args.to,
                    "--note is only used for moves into confirmed-event, ignoring"
                );
            }
            outcome
        }
    };

    let commit = match outcome {
        MoveOutcome::Committed(commit) => commit,
        MoveOutcome::Unchanged(reason) => {
            if !ctx.quiet {
                match ctx.output {
                    OutputFormat::Text => println!("unchanged: {}", reason),
                    OutputFormat::Json => print_json(
                        ctx,
                        &serde_json::json!({ "outcome": "unchanged", "reason": reason }),
                    ),
                }
            }
            return;
        }
        // A second hold cannot happen: the first was confirmed above.
        MoveOutcome::AwaitingAnnotation => ctx.fail("move is still awaiting annotation"),
    };

    let notifier = Arc::new(CliNotifier {
        output: ctx.output,
        quiet: ctx.quiet,
    });
    let sync = PersistenceSync::with_notifier(ctx.store.clone(), notifier);
    if let SyncOutcome::Failed(_) = sync.persist(&commit).await {
        std::process::exit(1);
    }

    let position = board.find(&commit.record_id).map(|(_, index, _)| index);
    match ctx.output {
        OutputFormat::Json => print_json(
            ctx,
            &serde_json::json!({
                "outcome": "committed",
                "commit": commit,
                "position": position,
            }),
        ),
        OutputFormat::Text => {
            if !ctx.quiet {
                println!(
                    "moved {} to {} ({})",
                    commit.record_id,
                    commit.status.display_name(),
                    commit.status
                );
            }
        }
    }
}

/// Translate the command-line arguments into a move in view coordinates.
fn build_request(board: &Board, args: &MoveArgs<'_>) -> Result<MoveRequest, String> {
    let id = RecordId::from(args.id);
    let (source, _, _) = board
        .find(&id)
        .ok_or_else(|| format!("record '{}' is not on the board", id))?;

    let view = board.filtered_columns();
    let source_index = view
        .column(source)
        .position_of(&id)
        .ok_or_else(|| format!("record '{}' is hidden by the current filters", id))?;

    let destination_len = view.column(args.to).len();
    let last = if source == args.to {
        destination_len.saturating_sub(1)
    } else {
        destination_len
    };
    let destination_index = args.position.map_or(last, |p| p.min(last));

    Ok(MoveRequest::new(
        id,
        source,
        source_index,
        args.to,
        destination_index,
    ))
}

fn confirm(board: &mut Board, note: Option<&str>) -> Result<MoveOutcome, String> {
    let label = board.pending_destination_label().unwrap_or_default();
    let Some(note) = note else {
        board.cancel_annotation();
        return Err(format!(
            "moves into {} require a confirmation note (--note TEXT)",
            label
        ));
    };
    match board.confirm_annotation(note) {
        Ok(outcome) => Ok(outcome),
        Err(GateError::BlankAnnotation) => {
            board.cancel_annotation();
            Err("confirmation note must not be blank".to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}
