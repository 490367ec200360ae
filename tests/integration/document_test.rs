//! Integration tests for the document lifecycle.

mod helpers;

use paperhub_core::error::ErrorKind;
use paperhub_core::types::{DocumentId, FolderId, Patch};
use paperhub_service::UpdateDocumentRequest;

#[tokio::test]
async fn test_create_then_delete_restores_capacity() {
    let app = helpers::TestApp::new();
    let folder = app.filled_folder(1, 480, 100).await;

    let doc = app.document("Lease", 40, Some(folder.id)).await.unwrap();
    assert_eq!(app.used(folder.id).await, 140);

    app.documents.delete_document(doc.id).await.unwrap();
    assert_eq!(app.used(folder.id).await, 100);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_over_capacity_create_is_rejected() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;

    let err = app.document("Archive", 500, Some(folder.id)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientCapacity);
    assert!(err.is_recoverable());
    assert_eq!(app.used(folder.id).await, 0);
}

#[tokio::test]
async fn test_exact_fit_is_accepted() {
    let app = helpers::TestApp::new();
    let folder = app.filled_folder(1, 480, 470).await;

    app.document("Last", 10, Some(folder.id)).await.unwrap();
    assert_eq!(app.used(folder.id).await, 480);

    let err = app.document("One more", 1, Some(folder.id)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientCapacity);
}

#[tokio::test]
async fn test_unassigned_create_touches_no_folder() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;

    let doc = app.document("x", 10, None).await.unwrap();

    assert_eq!(doc.folder_id, None);
    assert_eq!(app.used(folder.id).await, 0);
}

#[tokio::test]
async fn test_zero_delta_resize_changes_nothing() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;
    let doc = app.document("Memo", 25, Some(folder.id)).await.unwrap();

    let updated = app
        .documents
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                sheets_count: Some(25),
                title: Some("Memo v2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Memo v2");
    assert_eq!(app.used(folder.id).await, 25);
}

#[tokio::test]
async fn test_move_preserves_total_usage() {
    let app = helpers::TestApp::new();
    let a = app.filled_folder(1, 480, 50).await;
    let b = app.filled_folder(1, 480, 70).await;
    let doc = app.document("Deed", 30, Some(a.id)).await.unwrap();

    let moved = app
        .documents
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                folder_id: Patch::Set(b.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.folder_id, Some(b.id));
    assert_eq!(app.used(a.id).await, 50);
    assert_eq!(app.used(b.id).await, 100);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_move_with_resize() {
    let app = helpers::TestApp::new();
    let a = app.folder(1, 480).await;
    let b = app.folder(1, 480).await;
    let doc = app.document("Deed", 30, Some(a.id)).await.unwrap();

    app.documents
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                folder_id: Patch::Set(b.id),
                sheets_count: Some(45),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(app.used(a.id).await, 0);
    assert_eq!(app.used(b.id).await, 45);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_rejected_move_is_repaired_by_reconcile() {
    let app = helpers::TestApp::new();
    let a = app.folder(1, 480).await;
    let full = app.filled_folder(1, 480, 480).await;
    let doc = app.document("Deed", 30, Some(a.id)).await.unwrap();

    let err = app
        .documents
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                folder_id: Patch::Set(full.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientCapacity);

    // The release from the old folder stays committed.
    assert_eq!(app.used(a.id).await, 0);
    let fixed = app.reconciler.reconcile().await.unwrap();
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0].folder_id, a.id);
    assert_eq!(app.used(a.id).await, 30);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_assign_previously_unassigned_document() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;
    let doc = app.document("Loose", 15, None).await.unwrap();

    app.documents
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                folder_id: Patch::Set(folder.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(app.used(folder.id).await, 15);
    let listed = app.documents.list_documents(folder.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, doc.id);
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let app = helpers::TestApp::new();

    let err = app.documents.get_document(DocumentId(404)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = app.documents.delete_document(DocumentId(404)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = app
        .documents
        .update_document(DocumentId(404), UpdateDocumentRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = app.document("Orphan", 3, Some(FolderId(404))).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = app.documents.list_documents(FolderId(404)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;

    let err = app.document("", 3, Some(folder.id)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = app.document("Negative", -3, Some(folder.id)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let doc = app.document("Fine", 3, Some(folder.id)).await.unwrap();
    let err = app
        .documents
        .update_document(
            doc.id,
            UpdateDocumentRequest {
                sheets_count: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(app.used(folder.id).await, 3);
}

#[tokio::test]
async fn test_failed_insert_is_compensated() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;
    app.store.fail_document_writes(true).await;

    let err = app.document("Lost", 20, Some(folder.id)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(app.used(folder.id).await, 0);

    app.store.fail_document_writes(false).await;
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_delete_survives_folder_write_failure() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;
    let doc = app.document("Memo", 12, Some(folder.id)).await.unwrap();
    app.store.fail_folder_writes_after(Some(0)).await;

    app.documents.delete_document(doc.id).await.unwrap();
    app.store.fail_folder_writes_after(None).await;

    // The counter is stale until reconciliation.
    assert_eq!(app.used(folder.id).await, 12);
    app.reconciler.reconcile().await.unwrap();
    assert_eq!(app.used(folder.id).await, 0);
}
