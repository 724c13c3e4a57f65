#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the wildfire archive loader.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wildfire_map_config::AppConfig;
use wildfire_map_database::queries::MAX_INSERT_ROWS;
use wildfire_map_database::{db, run_migrations};
use wildfire_map_ingest::ingest;
use wildfire_map_ingest_models::{IngestOptions, IngestOutcome};

#[derive(Parser)]
#[command(name = "wildfire_map_ingest", about = "Wildfire archive loader")]
struct Cli {
    /// TOML config file. Without it, settings come from the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the source archive into an empty fires table (default)
    Load {
        /// ZIP archive to read (overrides `SOURCE_ARCHIVE`)
        #[arg(long)]
        archive: Option<PathBuf>,
        /// CSV member inside the archive (overrides `SOURCE_MEMBER`)
        #[arg(long)]
        member: Option<String>,
        /// Rows per INSERT statement
        #[arg(long, default_value_t = 1000)]
        batch_size: usize,
    },
    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Load {
        archive: None,
        member: None,
        batch_size: 1000,
    });

    let db = db::connect(&config.database).await?;
    run_migrations(db.as_ref()).await?;

    match command {
        Commands::Migrate => {
            log::info!("Migrations complete.");
        }
        Commands::Load {
            archive,
            member,
            batch_size,
        } => {
            if batch_size > MAX_INSERT_ROWS {
                log::warn!("--batch-size {batch_size} exceeds {MAX_INSERT_ROWS}, clamping");
            }

            let options = IngestOptions {
                archive_path: archive.unwrap_or(config.source_archive_path),
                member: member.unwrap_or(config.source_member),
                batch_rows: batch_size,
            };

            match ingest(db.as_ref(), &options).await? {
                IngestOutcome::Loaded { rows } => {
                    log::info!("Loaded {rows} rows into fires");
                }
                IngestOutcome::SkippedNotEmpty { existing } => {
                    log::info!("fires already contains {existing} rows; nothing to do");
                }
            }
        }
    }

    Ok(())
}
