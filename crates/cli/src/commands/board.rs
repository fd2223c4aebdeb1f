use sigboard_board::views::RiskTone;
use sigboard_board::{Columns, FilterSet, Record};

use super::{load_board, print_json, Context};
use crate::{FilterArgs, OutputFormat};

pub(crate) async fn cmd_board(ctx: &Context, filter: &FilterArgs) {
    let board = load_board(ctx, filter).await;
    let view = board.filtered_columns();

    match ctx.output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "filter": board.filter(),
                "columns": view.as_ref(),
            });
            print_json(ctx, &json);
        }
        OutputFormat::Text => print!("{}", render_text(view, board.filter(), ctx.quiet)),
    }
}

fn render_text(view: &Columns, filter: &FilterSet, quiet: bool) -> String {
    let mut out = String::new();
    if filter.is_active() && !quiet {
        out.push_str(&format!("filter: {}\n\n", describe_filter(filter)));
    }
    for column in view.iter() {
        out.push_str(&format!(
            "{} [{}]\n",
            column.state().display_name(),
            column.len()
        ));
        for record in column.records() {
            out.push_str(&format!("  {}\n", card_line(record)));
        }
        out.push('\n');
    }
    out
}

fn describe_filter(filter: &FilterSet) -> String {
    let mut parts = Vec::new();
    if let Some(source) = &filter.source_name {
        parts.push(format!("source={}", source));
    }
    if let Some(risk) = &filter.risk_level {
        parts.push(format!("risk={}", risk));
    }
    parts.join(" ")
}

fn card_line(record: &Record) -> String {
    let tone = match RiskTone::of_record(record) {
        RiskTone::High => "!!",
        RiskTone::Medium => "! ",
        RiskTone::Low => "  ",
    };
    let mut line = format!("{} {:<6} {}", tone, record.id.as_str(), record.title);
    let source = record.source_name.as_deref().unwrap_or("-");
    let risk = record.risk_level.as_deref().unwrap_or("-");
    line.push_str(&format!("  ({}, {})", source, risk));
    line
}
