//! Folder usage value object.

use serde::{Deserialize, Serialize};

use paperhub_core::types::FolderId;

use super::model::Folder;

/// Capacity summary of a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderUsage {
    /// The folder this summary describes.
    pub folder_id: FolderId,
    /// Sheet capacity.
    pub total_sheets: i32,
    /// Reserved sheets.
    pub used_sheets: i32,
    /// Free sheets (never reported below zero).
    pub available_sheets: i32,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl FolderUsage {
    /// Summarize a folder.
    pub fn new(folder: &Folder) -> Self {
        let available_sheets = (folder.total_sheets - folder.used_sheets).max(0);
        let usage_percent = if folder.total_sheets == 0 {
            0.0
        } else {
            (folder.used_sheets as f64 / folder.total_sheets as f64) * 100.0
        };

        Self {
            folder_id: folder.id,
            total_sheets: folder.total_sheets,
            used_sheets: folder.used_sheets,
            available_sheets,
            usage_percent,
        }
    }

    /// Check if the folder is full.
    pub fn is_full(&self) -> bool {
        self.used_sheets >= self.total_sheets
    }
}
