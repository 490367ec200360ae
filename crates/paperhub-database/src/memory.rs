//! In-memory store for tests and single-process deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use paperhub_core::error::AppError;
use paperhub_core::result::AppResult;
use paperhub_core::types::{DocumentId, FolderId, FolderTypeId};
use paperhub_entity::document::{Document, NewDocument};
use paperhub_entity::folder::{CreateFolder, Folder};

use crate::store::{DocumentStore, FolderStore};

/// Write failures to inject, for exercising compensation paths.
#[derive(Debug, Default)]
struct Faults {
    /// Document inserts/updates/deletes fail while set.
    document_writes: bool,
    /// Number of counter writes that still succeed; `None` means unlimited.
    folder_write_budget: Option<usize>,
}

/// Internal state for the memory store.
#[derive(Debug, Default)]
struct InnerState {
    folders: BTreeMap<FolderId, Folder>,
    documents: BTreeMap<DocumentId, Document>,
    next_folder_id: i64,
    next_document_id: i64,
    faults: Faults,
}

impl InnerState {
    fn check_document_write(&self) -> AppResult<()> {
        if self.faults.document_writes {
            return Err(AppError::persistence("Injected document write failure"));
        }
        Ok(())
    }

    fn check_folder_write(&mut self) -> AppResult<()> {
        match self.faults.folder_write_budget.as_mut() {
            Some(0) => Err(AppError::persistence("Injected folder write failure")),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Storage collaborator backed by ordered maps behind a Tokio `RwLock`.
///
/// Each call is atomic on its own; read-modify-write sequences across calls
/// still need the service layer's per-folder locks.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<InnerState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a folder with an explicit id and usage.
    ///
    /// Bypasses the capacity ledger; meant for seeding fixtures.
    pub async fn insert_folder(&self, folder: Folder) {
        let mut state = self.state.write().await;
        state.next_folder_id = state.next_folder_id.max(folder.id.get());
        state.folders.insert(folder.id, folder);
    }

    /// Makes every document write fail until switched off.
    pub async fn fail_document_writes(&self, enabled: bool) {
        self.state.write().await.faults.document_writes = enabled;
    }

    /// Lets `successes` more `used_sheets` writes through, then fails the
    /// rest. Folder creation is not counted. `None` removes the limit.
    pub async fn fail_folder_writes_after(&self, successes: Option<usize>) {
        self.state.write().await.faults.folder_write_budget = successes;
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;

        state.next_folder_id += 1;
        let now = Utc::now();
        let folder = Folder {
            id: FolderId(state.next_folder_id),
            folder_type_id: data.folder_type_id,
            name: data.name.clone(),
            total_sheets: data.total_sheets,
            used_sheets: 0,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        debug!(folder_id = %folder.id, "Folder inserted");
        Ok(folder)
    }

    async fn get_folder_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn update_folder(&self, current: &Folder, used_sheets: i32) -> AppResult<Option<Folder>> {
        let mut state = self.state.write().await;
        state.check_folder_write()?;

        let stored = state
            .folders
            .get_mut(&current.id)
            .ok_or_else(|| AppError::not_found(format!("Folder {} not found", current.id)))?;
        if stored.used_sheets != current.used_sheets {
            debug!(
                folder_id = %current.id,
                expected = current.used_sheets,
                stored = stored.used_sheets,
                "Folder counter changed since it was read"
            );
            return Ok(None);
        }
        stored.used_sheets = used_sheets;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn find_folder_by_type_and_capacity(
        &self,
        folder_type_id: FolderTypeId,
        sheets_required: i32,
    ) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .find(|f| f.folder_type_id == folder_type_id && f.free_sheets() >= sheets_required)
            .cloned())
    }

    async fn list_folders(&self, folder_type_id: Option<FolderTypeId>) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .filter(|f| folder_type_id.is_none_or(|t| f.folder_type_id == t))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, data: &NewDocument) -> AppResult<Document> {
        let mut state = self.state.write().await;
        state.check_document_write()?;

        state.next_document_id += 1;
        let now = Utc::now();
        let document = Document {
            id: DocumentId(state.next_document_id),
            title: data.title.clone(),
            sheets_count: data.sheets_count,
            folder_id: data.folder_id,
            document_type_id: data.document_type_id,
            created_at: now,
            updated_at: now,
        };
        state.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.state.read().await.documents.get(&id).cloned())
    }

    async fn update_document(
        &self,
        current: &Document,
        next: &Document,
    ) -> AppResult<Option<Document>> {
        let mut state = self.state.write().await;
        state.check_document_write()?;

        let stored = state
            .documents
            .get_mut(&current.id)
            .ok_or_else(|| AppError::not_found(format!("Document {} not found", current.id)))?;
        if stored.folder_id != current.folder_id || stored.sheets_count != current.sheets_count {
            return Ok(None);
        }
        stored.title = next.title.clone();
        stored.sheets_count = next.sheets_count;
        stored.folder_id = next.folder_id;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.check_document_write()?;
        Ok(state.documents.remove(&id).is_some())
    }

    async fn list_documents_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<Document>> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .values()
            .filter(|d| d.folder_id == Some(folder_id))
            .cloned()
            .collect())
    }

    async fn sum_sheets_by_folder(&self) -> AppResult<HashMap<FolderId, i64>> {
        let state = self.state.read().await;
        let mut sums = HashMap::new();
        for document in state.documents.values() {
            if let Some(folder_id) = document.folder_id {
                *sums.entry(folder_id).or_insert(0) += i64::from(document.sheets_count);
            }
        }
        Ok(sums)
    }
}
