//! Integration tests for folder administration and recommendations.

mod helpers;

use paperhub_core::error::ErrorKind;
use paperhub_core::types::{DocumentTypeId, FolderId, FolderTypeId};

#[tokio::test]
async fn test_recommend_picks_folder_with_room() {
    let app = helpers::TestApp::new();
    let nearly_full = app.filled_folder(2, 480, 470).await;
    let roomy = app.filled_folder(2, 480, 100).await;
    assert_eq!(nearly_full.id, FolderId(1));
    assert_eq!(roomy.id, FolderId(2));

    let found = app
        .folders
        .recommend_folder(DocumentTypeId(2), 50)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, FolderId(2));
}

#[tokio::test]
async fn test_recommend_prefers_lowest_id() {
    let app = helpers::TestApp::new();
    let first = app.folder(3, 480).await;
    app.folder(3, 480).await;

    let found = app
        .folders
        .recommend_folder(DocumentTypeId(3), 10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn test_recommend_none_is_not_an_error() {
    let app = helpers::TestApp::new();
    app.filled_folder(1, 480, 480).await;

    let found = app.folders.recommend_folder(DocumentTypeId(1), 1).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_recommendation_reserves_nothing() {
    let app = helpers::TestApp::new();
    let folder = app.folder(1, 480).await;

    app.folders
        .recommend_folder(DocumentTypeId(1), 100)
        .await
        .unwrap();
    assert_eq!(app.used(folder.id).await, 0);
}

#[tokio::test]
async fn test_list_and_usage() {
    let app = helpers::TestApp::new();
    app.folder(1, 480).await;
    let b = app.filled_folder(2, 200, 50).await;
    app.folder(2, 480).await;

    assert_eq!(app.folders.list_folders(None).await.unwrap().len(), 3);
    let of_type_two = app
        .folders
        .list_folders(Some(FolderTypeId(2)))
        .await
        .unwrap();
    assert_eq!(of_type_two.len(), 2);
    assert_eq!(of_type_two[0].id, b.id);

    let usage = app.folders.folder_usage(b.id).await.unwrap();
    assert_eq!(usage.used_sheets, 50);
    assert_eq!(usage.available_sheets, 150);
    assert!((usage.usage_percent - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_get_missing_folder() {
    let app = helpers::TestApp::new();
    let err = app.folders.get_folder(FolderId(12)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
