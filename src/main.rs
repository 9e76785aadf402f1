//! Postgres Backup Maintenance Tool
//!
//! Provides CLI interface for backing up, listing, removing and restoring
//! database backups

mod backup;
mod config;
mod listing;
mod removal;
mod restore;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Settings;
use std::process::ExitCode;
use utils::messages::message_error;

#[derive(Parser)]
#[command(name = "pgbackup")]
#[command(about = "Backup and restore maintenance for the application database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the configured database into a compressed, timestamped backup file
    Backup,

    /// List the existing backup files, most recent first
    Backups,

    /// Delete a backup file from the backup directory
    RemoveBackup {
        /// Backup filename, as printed by the `backups` command
        filename: Option<String>,
    },

    /// Drop and recreate the database, then replay a backup file into it
    Restore {
        /// Backup filename, as printed by the `backups` command
        filename: Option<String>,
    },
}

/// Main entry point for the maintenance tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run_app().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            message_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env().context("Failed to load settings from environment")?;

    match cli.command {
        Commands::Backup => backup::run_backup_flow(&settings).await,
        Commands::Backups => listing::run_listing_flow(&settings),
        Commands::RemoveBackup { filename } => {
            removal::run_removal_flow(&settings, filename.as_deref())
        }
        Commands::Restore { filename } => {
            restore::run_restore_flow(&settings, filename.as_deref()).await
        }
    }
}
