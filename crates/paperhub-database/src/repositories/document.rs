//! Document repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use paperhub_core::error::{AppError, ErrorKind};
use paperhub_core::result::AppResult;
use paperhub_core::types::{DocumentId, FolderId};
use paperhub_entity::document::{Document, NewDocument};

use crate::store::DocumentStore;

/// Repository for document rows.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn create_document(&self, data: &NewDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (title, sheets_count, folder_id, document_type_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.title)
        .bind(data.sheets_count)
        .bind(data.folder_id)
        .bind(data.document_type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Persistence, "Failed to create document", e)
        })
    }

    async fn get_document_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Persistence, "Failed to find document", e)
            })
    }

    async fn update_document(
        &self,
        current: &Document,
        next: &Document,
    ) -> AppResult<Option<Document>> {
        let updated = sqlx::query_as::<_, Document>(
            "UPDATE documents SET title = $2, sheets_count = $3, folder_id = $4, updated_at = NOW() \
             WHERE id = $1 AND sheets_count = $5 AND folder_id IS NOT DISTINCT FROM $6 \
             RETURNING *",
        )
        .bind(current.id)
        .bind(&next.title)
        .bind(next.sheets_count)
        .bind(next.folder_id)
        .bind(current.sheets_count)
        .bind(current.folder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Persistence, "Failed to update document", e)
        })?;

        if updated.is_none() && self.get_document_by_id(current.id).await?.is_none() {
            return Err(AppError::not_found(format!("Document {} not found", current.id)));
        }
        Ok(updated)
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Persistence, "Failed to delete document", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_documents_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE folder_id = $1 ORDER BY id ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to list documents", e))
    }

    async fn sum_sheets_by_folder(&self) -> AppResult<HashMap<FolderId, i64>> {
        let rows: Vec<(FolderId, i64)> = sqlx::query_as(
            "SELECT folder_id, COALESCE(SUM(sheets_count), 0)::BIGINT FROM documents \
             WHERE folder_id IS NOT NULL GROUP BY folder_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Persistence, "Failed to sum document sheets", e)
        })?;

        Ok(rows.into_iter().collect())
    }
}
