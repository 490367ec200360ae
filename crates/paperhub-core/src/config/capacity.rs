//! Folder capacity defaults.

use serde::{Deserialize, Serialize};

/// Defaults applied when a caller leaves capacity-related fields empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Sheet capacity given to a new folder when none is specified.
    #[serde(default = "default_total_sheets")]
    pub default_total_sheets: i32,
    /// Document type used for documents created without one.
    #[serde(default = "default_document_type_id")]
    pub default_document_type_id: i64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            default_total_sheets: default_total_sheets(),
            default_document_type_id: default_document_type_id(),
        }
    }
}

fn default_total_sheets() -> i32 {
    480
}

fn default_document_type_id() -> i64 {
    1
}
