//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use paperhub_core::error::AppError;
use paperhub_database::DatabasePool;
use paperhub_database::migration::{self, MigrationStatus};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show which migrations have been applied
    Status,
}

/// Migration display row
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    /// Version
    version: i64,
    /// Description
    description: String,
    /// Applied
    applied: bool,
}

impl From<MigrationStatus> for MigrationRow {
    fn from(m: MigrationStatus) -> Self {
        Self {
            version: m.version,
            description: m.description,
            applied: m.applied,
        }
    }
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let applied = migration::run_migrations(pool.pool()).await?;
            if applied.is_empty() {
                output::print_success("Database schema is already up to date.");
            } else {
                output::print_success(&format!("Applied {} migration(s).", applied.len()));
            }
        }
        MigrateCommand::Status => {
            let rows: Vec<MigrationRow> = migration::migration_status(pool.pool())
                .await?
                .into_iter()
                .map(MigrationRow::from)
                .collect();
            output::print_list(&rows, format)?;
        }
    }
    Ok(())
}
