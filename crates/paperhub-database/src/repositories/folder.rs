//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use paperhub_core::error::{AppError, ErrorKind};
use paperhub_core::result::AppResult;
use paperhub_core::types::{FolderId, FolderTypeId};
use paperhub_entity::folder::{CreateFolder, Folder};

use crate::store::FolderStore;

/// Repository for folder rows.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: FolderId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM folders WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to find folder", e))
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (folder_type_id, name, total_sheets, used_sheets) \
             VALUES ($1, $2, $3, 0) RETURNING *",
        )
        .bind(data.folder_type_id)
        .bind(&data.name)
        .bind(data.total_sheets)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("folders_total_sheets_check") =>
            {
                AppError::validation(format!(
                    "Folder capacity must be positive, got {}",
                    data.total_sheets
                ))
            }
            _ => AppError::with_source(ErrorKind::Persistence, "Failed to create folder", e),
        })
    }

    async fn get_folder_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to find folder", e))
    }

    async fn update_folder(&self, current: &Folder, used_sheets: i32) -> AppResult<Option<Folder>> {
        let updated = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET used_sheets = $3, updated_at = NOW() \
             WHERE id = $1 AND used_sheets = $2 RETURNING *",
        )
        .bind(current.id)
        .bind(current.used_sheets)
        .bind(used_sheets)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to update folder", e))?;

        if updated.is_none() && !self.exists(current.id).await? {
            return Err(AppError::not_found(format!("Folder {} not found", current.id)));
        }
        Ok(updated)
    }

    async fn find_folder_by_type_and_capacity(
        &self,
        folder_type_id: FolderTypeId,
        sheets_required: i32,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE folder_type_id = $1 AND (total_sheets - used_sheets) >= $2 \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(folder_type_id)
        .bind(sheets_required)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Persistence, "Failed to search folders", e)
        })
    }

    async fn list_folders(&self, folder_type_id: Option<FolderTypeId>) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE ($1::BIGINT IS NULL OR folder_type_id = $1) ORDER BY id ASC",
        )
        .bind(folder_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to list folders", e))
    }
}
