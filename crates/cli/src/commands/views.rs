use sigboard_board::views::{counts_by_risk, counts_by_state, map_markers, Count, MapMarker};
use sigboard_board::FilterCandidates;

use super::{load_board, print_json, Context};
use crate::{FilterArgs, OutputFormat};

pub(crate) async fn cmd_filters(ctx: &Context) {
    let board = load_board(ctx, &FilterArgs::default()).await;
    let candidates = board.filter_candidates();
    match ctx.output {
        OutputFormat::Json => print_json(ctx, candidates),
        OutputFormat::Text => print!("{}", render_candidates(candidates)),
    }
}

pub(crate) async fn cmd_stats(ctx: &Context) {
    let board = load_board(ctx, &FilterArgs::default()).await;
    let by_risk = counts_by_risk(board.columns());
    let by_state = counts_by_state(board.columns());
    match ctx.output {
        OutputFormat::Json => print_json(
            ctx,
            &serde_json::json!({ "byRisk": by_risk, "byState": by_state }),
        ),
        OutputFormat::Text => {
            print!("{}", render_counts("by risk", &by_risk));
            println!();
            print!("{}", render_counts("by state", &by_state));
        }
    }
}

pub(crate) async fn cmd_markers(ctx: &Context) {
    let board = load_board(ctx, &FilterArgs::default()).await;
    let markers = map_markers(board.columns());
    match ctx.output {
        OutputFormat::Json => print_json(ctx, &markers),
        OutputFormat::Text => {
            for marker in &markers {
                println!("{}", marker_line(marker));
            }
            if markers.is_empty() && !ctx.quiet {
                println!("no records with coordinates");
            }
        }
    }
}

fn render_candidates(candidates: &FilterCandidates) -> String {
    format!(
        "sources: {}\nrisks:   {}\n",
        candidates.source_names.join(", "),
        candidates.risk_levels.join(", ")
    )
}

fn render_counts(title: &str, counts: &[Count]) -> String {
    let width = counts.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut out = format!("{}:\n", title);
    for count in counts {
        out.push_str(&format!("  {:<width$}  {}\n", count.name, count.value));
    }
    out
}

fn marker_line(marker: &MapMarker) -> String {
    format!(
        "{}  {:.5},{:.5}  {}  [{}] {}",
        marker.id,
        marker.latitude,
        marker.longitude,
        marker.title,
        marker.status,
        marker.neighborhood.as_deref().unwrap_or("")
    )
    .trim_end()
    .to_string()
}
