//! events-jsonld CLI
//!
//! Fetches the festivals & events dataset and publishes it as JSON-LD.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use events_jsonld::{error::Result, models::Config, pipeline, storage::LocalStorage, utils::http};

/// events-jsonld - Municipal events as schema.org JSON-LD
#[derive(Parser, Debug)]
#[command(name = "events-jsonld", version, about = "Municipal events as schema.org JSON-LD")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Output directory (overrides output.storage_dir)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Defaults to `monthly`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream events into per-month files and index.json
    Monthly,

    /// Write every event into a single events.jsonld
    Snapshot,

    /// Merge daily JSONL snapshots into all.jsonld and upcoming.jsonld
    Merge,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(dir) = cli.storage_dir {
        config.output.storage_dir = dir;
    }

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let storage = LocalStorage::new(&config.output.storage_dir);
    log::info!("Output directory: {}", storage.root().display());

    match cli.command.unwrap_or(Command::Monthly) {
        Command::Monthly => {
            let client = http::create_client(&config.source)?;
            let (summary, _) = pipeline::run_monthly(&config, &client, &storage).await?;
            log::info!(
                "Months available: {} (latest: {})",
                summary.index.available.len(),
                if summary.index.latest.is_empty() {
                    "none"
                } else {
                    summary.index.latest.as_str()
                }
            );
        }

        Command::Snapshot => {
            let client = http::create_client(&config.source)?;
            pipeline::run_snapshot(&config, &client, &storage).await?;
        }

        Command::Merge => {
            pipeline::run_merge(&storage, &config.output).await?;
        }

        Command::Validate => {
            log::info!("✓ Config OK");
        }
    }

    log::info!("Done!");

    Ok(())
}
