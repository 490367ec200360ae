//! Folder usage reconciliation command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use super::Services;
use crate::output::{self, OutputFormat};
use paperhub_core::error::AppError;
use paperhub_service::UsageDrift;

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Rewrite drifted counters instead of only reporting them
    #[arg(long)]
    pub apply: bool,
}

/// Drift display row
#[derive(Debug, Serialize, Tabled)]
struct DriftRow {
    /// Folder ID
    folder: i64,
    /// Stored used_sheets
    recorded: i32,
    /// Sheets actually filed
    actual: i64,
    /// Difference
    delta: i64,
}

impl From<&UsageDrift> for DriftRow {
    fn from(d: &UsageDrift) -> Self {
        Self {
            folder: d.folder_id.get(),
            recorded: d.recorded,
            actual: d.actual,
            delta: d.delta(),
        }
    }
}

/// Execute the reconcile command
pub async fn execute(
    args: &ReconcileArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let drift = if args.apply {
        services.reconciler.reconcile().await?
    } else {
        services.reconciler.check().await?
    };

    if drift.is_empty() {
        output::print_success("Folder usage matches filed documents.");
        return Ok(());
    }

    let rows: Vec<DriftRow> = drift.iter().map(DriftRow::from).collect();
    output::print_list(&rows, format)?;
    if args.apply {
        output::print_success(&format!("Reconciled {} folder(s).", rows.len()));
    } else {
        output::print_warning("Run with --apply to rewrite these counters.");
    }
    Ok(())
}
