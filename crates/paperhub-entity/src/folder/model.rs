//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use paperhub_core::types::{FolderId, FolderTypeId};

/// A physical folder with a fixed sheet capacity.
///
/// `used_sheets` must equal the sum of `sheets_count` over the documents
/// filed in this folder. Only the capacity ledger changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The folder classification.
    pub folder_type_id: FolderTypeId,
    /// Folder label.
    pub name: String,
    /// Sheet capacity, fixed at creation.
    pub total_sheets: i32,
    /// Sheets currently reserved by filed documents.
    pub used_sheets: i32,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Sheets still available.
    pub fn free_sheets(&self) -> i32 {
        self.total_sheets - self.used_sheets
    }

    /// Returns `true` if no document is filed here.
    pub fn is_empty(&self) -> bool {
        self.used_sheets == 0
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder label.
    pub name: String,
    /// The folder classification.
    pub folder_type_id: FolderTypeId,
    /// Sheet capacity.
    pub total_sheets: i32,
}
