//! Usage reconciliation between folder counters and the documents filed in them.
//!
//! Moves rejected for capacity and deletes whose release failed leave
//! `used_sheets` out of step with reality. This finds and repairs that drift.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use paperhub_core::error::AppError;
use paperhub_core::result::AppResult;
use paperhub_core::types::FolderId;
use paperhub_database::store::{DocumentStore, FolderStore};

use crate::lock::FolderLocks;

/// A folder whose counter disagrees with its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDrift {
    /// The drifted folder.
    pub folder_id: FolderId,
    /// The stored `used_sheets`.
    pub recorded: i32,
    /// Sum of `sheets_count` over the folder's documents.
    pub actual: i64,
}

impl UsageDrift {
    /// `recorded - actual`; positive means the folder over-counts.
    pub fn delta(&self) -> i64 {
        i64::from(self.recorded) - self.actual
    }
}

/// Recomputes folder usage from documents.
#[derive(Debug, Clone)]
pub struct UsageReconciler {
    /// Folder persistence.
    folders: Arc<dyn FolderStore>,
    /// Document persistence.
    documents: Arc<dyn DocumentStore>,
    /// Must be the registry the document service uses.
    locks: FolderLocks,
}

impl UsageReconciler {
    /// Creates a new usage reconciler.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        documents: Arc<dyn DocumentStore>,
        locks: FolderLocks,
    ) -> Self {
        Self {
            folders,
            documents,
            locks,
        }
    }

    /// Reports every drifted folder without changing anything.
    ///
    /// Reads are not locked, so a folder with an operation in flight may be
    /// reported spuriously.
    pub async fn check(&self) -> AppResult<Vec<UsageDrift>> {
        let folders = self.folders.list_folders(None).await?;
        let sums = self.documents.sum_sheets_by_folder().await?;

        let drift: Vec<UsageDrift> = folders
            .iter()
            .filter_map(|folder| {
                let actual = sums.get(&folder.id).copied().unwrap_or(0);
                (i64::from(folder.used_sheets) != actual).then_some(UsageDrift {
                    folder_id: folder.id,
                    recorded: folder.used_sheets,
                    actual,
                })
            })
            .collect();

        for d in &drift {
            warn!(
                folder_id = %d.folder_id,
                recorded = d.recorded,
                actual = d.actual,
                delta = d.delta(),
                "Folder usage drift detected"
            );
        }
        Ok(drift)
    }

    /// Rewrites the counter of every drifted folder and returns what was fixed.
    ///
    /// Each folder is re-read under its lock, so drift that resolved itself
    /// in the meantime is left alone. A folder whose counter another process
    /// changes before the rewrite lands is skipped and shows up again on the
    /// next check.
    pub async fn reconcile(&self) -> AppResult<Vec<UsageDrift>> {
        let candidates = self.check().await?;
        let mut fixed = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let _guard = self.locks.lock(candidate.folder_id).await;

            let Some(folder) = self.folders.get_folder_by_id(candidate.folder_id).await? else {
                continue;
            };
            let actual: i64 = self
                .documents
                .list_documents_by_folder(folder.id)
                .await?
                .iter()
                .map(|d| i64::from(d.sheets_count))
                .sum();
            if i64::from(folder.used_sheets) == actual {
                continue;
            }

            let used = i32::try_from(actual).map_err(|_| {
                AppError::invariant_violation(format!(
                    "Folder {} holds {actual} sheets, beyond the counter's range",
                    folder.id
                ))
            })?;
            if used > folder.total_sheets {
                error!(
                    folder_id = %folder.id,
                    used_sheets = used,
                    total_sheets = folder.total_sheets,
                    "Folder holds more sheets than its capacity"
                );
            }

            let drift = UsageDrift {
                folder_id: folder.id,
                recorded: folder.used_sheets,
                actual,
            };
            if self.folders.update_folder(&folder, used).await?.is_none() {
                warn!(
                    folder_id = %folder.id,
                    "Folder counter changed during reconciliation, skipped"
                );
                continue;
            }

            info!(
                folder_id = %drift.folder_id,
                from = drift.recorded,
                to = used,
                "Folder usage reconciled"
            );
            fixed.push(drift);
        }

        Ok(fixed)
    }
}
