//! wbsync - Reconcile financial WBS records onto Monday.com boards
//!
//! Subcommands:
//! - `sync`: load a reconciliation config and a records file, then create or
//!   update one board item per WBS element
//! - `check`: verify that the API endpoint is reachable and the token works
//!
//! API settings come from the environment (`MONDAY_API_TOKEN`,
//! `MONDAY_API_URL`, `MONDAY_API_VERSION`, `MONDAY_TIMEOUT_SECS`); a `.env`
//! file in the working directory is loaded first if present.

use clap::{Parser, Subcommand};

use wbsync_cli::commands;
use wbsync_cli::error::CliResult;
use wbsync_cli::logging::{init_logging, LogLevel};

/// wbsync - WBS to board reconciliation
#[derive(Parser)]
#[command(name = "wbsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log per-record decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log GraphQL requests and pipeline stages
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a records file onto boards
    Sync(commands::sync::SyncArgs),

    /// Check API connectivity and credentials
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(LogLevel::from_flags(cli.verbose, cli.debug), cli.log_json);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args).await,
        Commands::Check(args) => commands::check::execute(args).await,
    }
}
