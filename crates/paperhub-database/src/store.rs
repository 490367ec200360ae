//! Storage collaborator traits.
//!
//! Services hold these as `Arc<dyn ...>` and never see a concrete
//! persistence technology. Lookups return `Ok(None)` for absent rows;
//! every `Err` is a [`ErrorKind::Persistence`](paperhub_core::error::ErrorKind)
//! failure unless documented otherwise.
//!
//! Writes that move capacity are conditional on the row the caller read,
//! so writers in different processes cannot overwrite each other. A lost
//! race is reported as `Ok(None)`; the caller re-reads and decides again.

use std::collections::HashMap;

use async_trait::async_trait;

use paperhub_core::result::AppResult;
use paperhub_core::types::{DocumentId, FolderId, FolderTypeId};
use paperhub_entity::document::{Document, NewDocument};
use paperhub_entity::folder::{CreateFolder, Folder};

/// Folder persistence.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug {
    /// Insert a folder with `used_sheets = 0` and return it with its id.
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Find a folder by ID.
    async fn get_folder_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Set `used_sheets` if the stored counter still equals
    /// `current.used_sheets`.
    ///
    /// Returns the updated folder, or `Ok(None)` if another writer changed
    /// the counter first. Fails with `NotFound` if the folder no longer
    /// exists.
    async fn update_folder(&self, current: &Folder, used_sheets: i32) -> AppResult<Option<Folder>>;

    /// Lowest-id folder of the given type with at least `sheets_required`
    /// free sheets.
    async fn find_folder_by_type_and_capacity(
        &self,
        folder_type_id: FolderTypeId,
        sheets_required: i32,
    ) -> AppResult<Option<Folder>>;

    /// All folders, optionally restricted to one type, ordered by id.
    async fn list_folders(&self, folder_type_id: Option<FolderTypeId>) -> AppResult<Vec<Folder>>;
}

/// Document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Insert a document and return it with its id.
    async fn create_document(&self, data: &NewDocument) -> AppResult<Document>;

    /// Find a document by ID.
    async fn get_document_by_id(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// Persist `next`'s mutable fields if the stored placement
    /// (`folder_id`, `sheets_count`) still matches `current`.
    ///
    /// Returns `Ok(None)` if another writer moved or resized the document
    /// first. Fails with `NotFound` if the document no longer exists.
    async fn update_document(
        &self,
        current: &Document,
        next: &Document,
    ) -> AppResult<Option<Document>>;

    /// Delete a document. Returns `true` if a row was removed.
    async fn delete_document(&self, id: DocumentId) -> AppResult<bool>;

    /// Documents filed in a folder, ordered by id.
    async fn list_documents_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<Document>>;

    /// Sum of `sheets_count` per folder over all assigned documents.
    async fn sum_sheets_by_folder(&self) -> AppResult<HashMap<FolderId, i64>>;
}
