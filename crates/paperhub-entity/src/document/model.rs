//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use paperhub_core::types::{DocumentId, DocumentTypeId, FolderId};

/// A paper document, optionally filed in one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Document title.
    pub title: String,
    /// Number of sheets the document occupies.
    pub sheets_count: i32,
    /// Folder the document is filed in (None = unassigned).
    pub folder_id: Option<FolderId>,
    /// The document classification.
    pub document_type_id: DocumentTypeId,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Check if the document is filed in a folder.
    pub fn is_assigned(&self) -> bool {
        self.folder_id.is_some()
    }
}

/// Data required to insert a new document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// Document title.
    pub title: String,
    /// Number of sheets.
    pub sheets_count: i32,
    /// Target folder.
    pub folder_id: Option<FolderId>,
    /// The document classification.
    pub document_type_id: DocumentTypeId,
}
