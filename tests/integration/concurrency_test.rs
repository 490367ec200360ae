//! Integration tests for concurrent operations on shared folders.

mod helpers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use paperhub_core::config::CapacityConfig;
use paperhub_core::error::ErrorKind;
use paperhub_core::result::AppResult;
use paperhub_core::types::{DocumentId, DocumentTypeId, FolderId, FolderTypeId, Patch};
use paperhub_database::MemoryStore;
use paperhub_database::store::{DocumentStore, FolderStore};
use paperhub_entity::document::{Document, NewDocument};
use paperhub_entity::folder::{CreateFolder, Folder};
use paperhub_service::{
    CreateDocumentRequest, DocumentLocks, DocumentService, FolderLocks, UpdateDocumentRequest,
    UsageReconciler,
};

/// Folder store whose reads take a while, widening the window between a
/// writer's read and its write.
#[derive(Debug, Clone)]
struct SlowFolders(MemoryStore);

#[async_trait]
impl FolderStore for SlowFolders {
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder> {
        self.0.create_folder(data).await
    }

    async fn get_folder_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.0.get_folder_by_id(id).await
    }

    async fn update_folder(&self, current: &Folder, used_sheets: i32) -> AppResult<Option<Folder>> {
        self.0.update_folder(current, used_sheets).await
    }

    async fn find_folder_by_type_and_capacity(
        &self,
        folder_type_id: FolderTypeId,
        sheets_required: i32,
    ) -> AppResult<Option<Folder>> {
        self.0
            .find_folder_by_type_and_capacity(folder_type_id, sheets_required)
            .await
    }

    async fn list_folders(&self, folder_type_id: Option<FolderTypeId>) -> AppResult<Vec<Folder>> {
        self.0.list_folders(folder_type_id).await
    }
}

/// Document store where another writer resizes the document just before
/// every update lands.
#[derive(Debug, Clone)]
struct ResizedUnderneath(MemoryStore);

#[async_trait]
impl DocumentStore for ResizedUnderneath {
    async fn create_document(&self, data: &NewDocument) -> AppResult<Document> {
        self.0.create_document(data).await
    }

    async fn get_document_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        self.0.get_document_by_id(id).await
    }

    async fn update_document(
        &self,
        current: &Document,
        next: &Document,
    ) -> AppResult<Option<Document>> {
        let mut resized = current.clone();
        resized.sheets_count += 1;
        self.0.update_document(current, &resized).await?;
        self.0.update_document(current, next).await
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<bool> {
        self.0.delete_document(id).await
    }

    async fn list_documents_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<Document>> {
        self.0.list_documents_by_folder(folder_id).await
    }

    async fn sum_sheets_by_folder(&self) -> AppResult<HashMap<FolderId, i64>> {
        self.0.sum_sheets_by_folder().await
    }
}

async fn new_folder(store: &MemoryStore, total_sheets: i32) -> Folder {
    store
        .create_folder(&CreateFolder {
            name: "Shared".to_string(),
            folder_type_id: FolderTypeId(1),
            total_sheets,
        })
        .await
        .unwrap()
}

async fn used_sheets(store: &MemoryStore, id: FolderId) -> i32 {
    store.get_folder_by_id(id).await.unwrap().unwrap().used_sheets
}

fn new_document(title: String, sheets_count: i32, folder_id: FolderId) -> CreateDocumentRequest {
    CreateDocumentRequest {
        title,
        sheets_count,
        folder_id: Some(folder_id),
        document_type_id: Some(DocumentTypeId(1)),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_never_overfill() {
    let app = Arc::new(helpers::TestApp::new());
    let folder = app.folder(1, 100).await;
    let folder_id = folder.id;

    let tasks = (0..20).map(|i| {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.document(&format!("Doc {i}"), 10, Some(folder_id)).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| {
            r.as_ref()
                .is_err_and(|e| e.kind() == ErrorKind::InsufficientCapacity)
        })
        .count();

    assert_eq!(created, 10);
    assert_eq!(rejected, 10);
    assert_eq!(app.used(folder.id).await, 100);
    app.assert_consistent().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_moves_do_not_deadlock() {
    let app = Arc::new(helpers::TestApp::new());
    let a = app.folder(1, 480).await;
    let b = app.folder(1, 480).await;

    let mut in_a = Vec::new();
    let mut in_b = Vec::new();
    for i in 0..10 {
        in_a.push(app.document(&format!("A{i}"), 5, Some(a.id)).await.unwrap());
        in_b.push(app.document(&format!("B{i}"), 7, Some(b.id)).await.unwrap());
    }

    let moves = in_a
        .iter()
        .map(|d| (d.id, b.id))
        .chain(in_b.iter().map(|d| (d.id, a.id)))
        .map(|(doc, target)| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                app.documents
                    .update_document(
                        doc,
                        UpdateDocumentRequest {
                            folder_id: Patch::Set(target),
                            ..Default::default()
                        },
                    )
                    .await
            })
        });

    let results = tokio::time::timeout(std::time::Duration::from_secs(10), join_all(moves))
        .await
        .expect("moves deadlocked");
    for r in results {
        r.unwrap().unwrap();
    }

    assert_eq!(app.used(a.id).await, 70);
    assert_eq!(app.used(b.id).await, 50);
    app.assert_consistent().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deletes_of_one_document() {
    let app = Arc::new(helpers::TestApp::new());
    let folder = app.folder(1, 480).await;
    let doc_id = app.document("Once", 30, Some(folder.id)).await.unwrap().id;

    let deletes = (0..5).map(|_| {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.documents.delete_document(doc_id).await })
    });
    let results: Vec<_> = join_all(deletes)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(app.used(folder.id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independently_wired_services_never_overfill() {
    let store = MemoryStore::new();
    let folder = new_folder(&store, 100).await;
    let folder_id = folder.id;

    // One service per simulated process: nothing shared but the store.
    let tasks = (0..40).map(|i| {
        let service = DocumentService::new(
            Arc::new(store.clone()),
            Arc::new(SlowFolders(store.clone())),
            FolderLocks::new(),
            DocumentLocks::new(),
            CapacityConfig::default(),
        );
        tokio::spawn(async move {
            service
                .create_document(new_document(format!("Doc {i}"), 10, folder_id))
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| {
            r.as_ref()
                .is_err_and(|e| e.kind() == ErrorKind::InsufficientCapacity)
        })
        .count();
    assert_eq!(created, 10);
    assert_eq!(rejected, 30);

    assert_eq!(used_sheets(&store, folder_id).await, 100);

    let reconciler = UsageReconciler::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        FolderLocks::new(),
    );
    assert!(reconciler.check().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_move_raced_by_another_writer_is_reverted() {
    let store = MemoryStore::new();
    let a = new_folder(&store, 100).await;
    let b = new_folder(&store, 100).await;

    let plain = DocumentService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        FolderLocks::new(),
        DocumentLocks::new(),
        CapacityConfig::default(),
    );
    let doc = plain
        .create_document(new_document("Lease".to_string(), 10, a.id))
        .await
        .unwrap();

    let raced = DocumentService::new(
        Arc::new(ResizedUnderneath(store.clone())),
        Arc::new(store.clone()),
        FolderLocks::new(),
        DocumentLocks::new(),
        CapacityConfig::default(),
    );
    let err = raced
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                folder_id: Patch::Set(b.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(used_sheets(&store, a.id).await, 10);
    assert_eq!(used_sheets(&store, b.id).await, 0);

    let stored = store.get_document_by_id(doc.id).await.unwrap().unwrap();
    assert_eq!(stored.folder_id, Some(a.id));
    assert_eq!(stored.sheets_count, 11);
}
