pub(crate) mod board;
pub(crate) mod moves;
pub(crate) mod views;

use std::process;
use std::sync::Arc;

use serde::Serialize;
use sigboard_board::adapter::http::HttpRecordStore;
use sigboard_board::{Board, FilterKind};

use crate::{report_error, FilterArgs, OutputFormat};

/// What every subcommand needs: the store and how to talk to the operator.
pub(crate) struct Context {
    pub store: Arc<HttpRecordStore>,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Context {
    pub(crate) fn fail(&self, msg: &str) -> ! {
        report_error(msg, self.output, self.quiet);
        process::exit(1);
    }
}

/// Load the board from the store and apply the filter flags.
///
/// A failed fetch shows an empty board, as the engine does; the reason is
/// logged at `warn`.
pub(crate) async fn load_board(ctx: &Context, filter: &FilterArgs) -> Board {
    let mut board = Board::load(ctx.store.as_ref()).await;
    board.set_filter(FilterKind::Source, filter.source.as_deref());
    board.set_filter(FilterKind::Risk, filter.risk.as_deref());
    board
}

pub(crate) fn print_json<T: Serialize>(ctx: &Context, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => ctx.fail(&format!("serialization error: {}", e)),
    }
}
