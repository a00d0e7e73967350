mod commands;
mod render;
mod target;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use calsync_core::SyncConfig;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calsync")]
#[command(about = "Reconcile generated events with a remote calendar")]
struct Cli {
    /// Config file (default: ~/.config/calsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show every event and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the target events to the remote calendar
    Sync(SyncArgs),
    /// Show what sync would change without changing anything
    Plan(SyncArgs),
    /// List configured calendars
    Calendars,
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// JSON file with the target events, or "-" for stdin
    #[arg(short, long)]
    events: String,

    /// Configured calendar to sync (default: default_calendar)
    #[arg(short, long)]
    calendar: Option<String>,

    /// First day of the sync window (YYYY-MM-DD, default: today)
    #[arg(long)]
    from: Option<String>,

    /// Last day of the sync window (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CALSYNC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "calsync_core=debug,info" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => SyncConfig::config_path()?,
    };
    let config = SyncConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    match cli.command {
        Commands::Sync(args) => commands::sync::run(&config, &args, cli.verbose).await,
        Commands::Plan(args) => commands::plan::run(&config, &args, cli.verbose).await,
        Commands::Calendars => commands::calendars::run(&config, &config_path),
    }
}
