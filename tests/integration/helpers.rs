//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use paperhub_core::config::CapacityConfig;
use paperhub_core::types::{DocumentTypeId, FolderId, FolderTypeId};
use paperhub_database::MemoryStore;
use paperhub_database::store::FolderStore;
use paperhub_entity::document::Document;
use paperhub_entity::folder::Folder;
use paperhub_service::{
    CreateDocumentRequest, CreateFolderRequest, DocumentLocks, DocumentService, FolderLocks,
    FolderService, UsageReconciler,
};

/// Test application context
pub struct TestApp {
    /// Backing store, for direct inspection and fault injection
    pub store: MemoryStore,
    /// Folder administration and recommendations
    pub folders: FolderService,
    /// Document lifecycle
    pub documents: DocumentService,
    /// Usage drift repair
    pub reconciler: UsageReconciler,
}

impl TestApp {
    /// Create a new test application over an empty memory store
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let locks = FolderLocks::new();
        let config = CapacityConfig::default();

        Self {
            folders: FolderService::new(Arc::new(store.clone()), config.clone()),
            documents: DocumentService::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                locks.clone(),
                DocumentLocks::new(),
                config,
            ),
            reconciler: UsageReconciler::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                locks,
            ),
            store,
        }
    }

    /// Create an empty folder of the given type and capacity
    pub async fn folder(&self, folder_type: i64, total_sheets: i32) -> Folder {
        self.folders
            .create_folder(CreateFolderRequest {
                name: format!("Type {folder_type} folder"),
                folder_type_id: FolderTypeId(folder_type),
                total_sheets: Some(total_sheets),
            })
            .await
            .expect("Failed to create folder")
    }

    /// Create a folder and fill it to `used_sheets` with one document
    pub async fn filled_folder(&self, folder_type: i64, total_sheets: i32, used_sheets: i32) -> Folder {
        let folder = self.folder(folder_type, total_sheets).await;
        if used_sheets > 0 {
            self.document("Filler", used_sheets, Some(folder.id))
                .await
                .expect("Failed to fill folder");
        }
        self.reload(folder.id).await
    }

    /// Create a document of the default type
    pub async fn document(
        &self,
        title: &str,
        sheets_count: i32,
        folder_id: Option<FolderId>,
    ) -> paperhub_core::result::AppResult<Document> {
        self.documents
            .create_document(CreateDocumentRequest {
                title: title.to_string(),
                sheets_count,
                folder_id,
                document_type_id: Some(DocumentTypeId(1)),
            })
            .await
    }

    /// Re-read a folder from the store
    pub async fn reload(&self, id: FolderId) -> Folder {
        self.store
            .get_folder_by_id(id)
            .await
            .expect("Failed to load folder")
            .expect("Folder missing")
    }

    /// Current `used_sheets` of a folder
    pub async fn used(&self, id: FolderId) -> i32 {
        self.reload(id).await.used_sheets
    }

    /// Assert that every folder's counter matches its documents
    pub async fn assert_consistent(&self) {
        let drift = self.reconciler.check().await.expect("Failed to check usage");
        assert!(drift.is_empty(), "usage drift: {drift:?}");
    }
}
