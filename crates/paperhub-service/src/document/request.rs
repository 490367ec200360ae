//! Document request types with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use paperhub_core::error::AppError;
use paperhub_core::types::{DocumentTypeId, FolderId, Patch};

/// Request to create a document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    /// Document title.
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Number of sheets.
    #[validate(range(min = 1, message = "sheets_count must be positive"))]
    pub sheets_count: i32,
    /// Folder to file the document in.
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Document type (falls back to the configured default).
    #[serde(default)]
    pub document_type_id: Option<DocumentTypeId>,
}

/// Partial update of a document.
///
/// `None` / [`Patch::Unchanged`] leave a field as is;
/// `folder_id: Patch::Clear` unassigns the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    /// New title.
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    #[serde(default)]
    pub title: Option<String>,
    /// New sheet count.
    #[validate(range(min = 1, message = "sheets_count must be positive"))]
    #[serde(default)]
    pub sheets_count: Option<i32>,
    /// New folder assignment. Omitted from the JSON form when unchanged,
    /// since an explicit `null` means unassign.
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub folder_id: Patch<FolderId>,
}

impl UpdateDocumentRequest {
    /// Returns `true` if the request changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.sheets_count.is_none() && self.folder_id.is_unchanged()
    }
}

/// Runs the derived validation and rejects whitespace-only titles.
pub(crate) fn check<T: Validate>(request: &T, title: Option<&str>) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid document request: {e}")))?;

    if title.is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::validation("Title cannot be blank"));
    }
    Ok(())
}
