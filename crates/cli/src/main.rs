mod commands;
mod config;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use sigboard_board::adapter::http::HttpRecordStore;
use sigboard_board::WorkflowState;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Signal operations board.
#[derive(Parser)]
#[command(name = "sigboard", version, about = "Signal operations board")]
struct Cli {
    /// Base URL of the signal API (overrides SIGBOARD_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for the signal API (overrides SIGBOARD_AUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Path to a TOML config file (default: ./sigboard.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log debug detail to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Filter flags shared by the subcommands that read the board.
#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct FilterArgs {
    /// Only records from this source
    #[arg(long)]
    pub source: Option<String>,
    /// Only records with this risk level
    #[arg(long)]
    pub risk: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the board, column by column
    Board {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Move a record to another workflow state
    Move {
        /// Record id
        id: String,
        /// Destination state (intake, analysis, monitoring, confirmed-event, discarded)
        #[arg(long)]
        to: WorkflowState,
        /// Position in the destination column as displayed (default: last)
        #[arg(long)]
        position: Option<usize>,
        /// Confirmation note, required for moves into confirmed-event
        #[arg(long)]
        note: Option<String>,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List the values available to the source and risk filters
    Filters,

    /// Count records by risk level and by workflow state
    Stats,

    /// List records that carry coordinates
    Markers,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = match connect(&cli) {
        Ok(store) => Arc::new(store),
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let msg = format!("failed to create tokio runtime: {}", e);
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let ctx = commands::Context {
        store,
        output: cli.output,
        quiet: cli.quiet,
    };

    rt.block_on(async {
        match cli.command {
            Commands::Board { filter } => commands::board::cmd_board(&ctx, &filter).await,
            Commands::Move {
                id,
                to,
                position,
                note,
                filter,
            } => {
                commands::moves::cmd_move(
                    &ctx,
                    commands::moves::MoveArgs {
                        id: &id,
                        to,
                        position,
                        note: note.as_deref(),
                        filter: &filter,
                    },
                )
                .await
            }
            Commands::Filters => commands::views::cmd_filters(&ctx).await,
            Commands::Stats => commands::views::cmd_stats(&ctx).await,
            Commands::Markers => commands::views::cmd_markers(&ctx).await,
        }
    });
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins unless
/// `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn connect(cli: &Cli) -> Result<HttpRecordStore, String> {
    let file = config::load_config_file(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let store_config = config::resolve(
        file,
        |key| std::env::var(key).ok(),
        config::Overrides {
            api_url: cli.api_url.as_deref(),
            token: cli.token.as_deref(),
        },
    )
    .map_err(|e| e.to_string())?;
    tracing::debug!(base_url = %store_config.base_url, "resolved store settings");
    Ok(HttpRecordStore::new(store_config))
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
