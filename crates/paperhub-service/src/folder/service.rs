//! Folder administration and placement recommendations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use paperhub_core::config::CapacityConfig;
use paperhub_core::error::AppError;
use paperhub_core::result::AppResult;
use paperhub_core::types::{DocumentTypeId, FolderId, FolderTypeId};
use paperhub_database::store::FolderStore;
use paperhub_entity::folder::{CreateFolder, Folder, FolderUsage};

/// Manages folders and recommends where to file documents.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder persistence.
    folders: Arc<dyn FolderStore>,
    /// Capacity defaults.
    config: CapacityConfig,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder label.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: String,
    /// The folder classification.
    pub folder_type_id: FolderTypeId,
    /// Sheet capacity; the configured default when omitted.
    #[validate(range(min = 1, message = "total_sheets must be positive"))]
    #[serde(default)]
    pub total_sheets: Option<i32>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folders: Arc<dyn FolderStore>, config: CapacityConfig) -> Self {
        Self { folders, config }
    }

    /// Creates an empty folder.
    pub async fn create_folder(&self, req: CreateFolderRequest) -> AppResult<Folder> {
        req.validate()
            .map_err(|e| AppError::validation(format!("Invalid folder request: {e}")))?;
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be blank"));
        }

        let data = CreateFolder {
            name: req.name.trim().to_string(),
            folder_type_id: req.folder_type_id,
            total_sheets: req
                .total_sheets
                .unwrap_or(self.config.default_total_sheets),
        };
        let folder = self.folders.create_folder(&data).await?;

        info!(
            folder_id = %folder.id,
            folder_type_id = %folder.folder_type_id,
            total_sheets = folder.total_sheets,
            "Folder created"
        );
        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, id: FolderId) -> AppResult<Folder> {
        self.folders
            .get_folder_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Lists folders, optionally of one type, in ascending id order.
    pub async fn list_folders(&self, folder_type_id: Option<FolderTypeId>) -> AppResult<Vec<Folder>> {
        self.folders.list_folders(folder_type_id).await
    }

    /// Capacity summary of a folder.
    pub async fn folder_usage(&self, id: FolderId) -> AppResult<FolderUsage> {
        let folder = self.get_folder(id).await?;
        Ok(FolderUsage::new(&folder))
    }

    /// Suggests a folder for a document of the given type and size.
    ///
    /// Returns the lowest-id folder of the eligible type with enough free
    /// sheets, or `None` if no folder qualifies. Nothing is reserved; the
    /// caller still goes through the document service, which re-checks.
    pub async fn recommend_folder(
        &self,
        document_type_id: DocumentTypeId,
        sheets_count: i32,
    ) -> AppResult<Option<Folder>> {
        if sheets_count < 0 {
            return Err(AppError::validation("sheets_count cannot be negative"));
        }

        let folder_type_id = eligible_folder_type(document_type_id);
        let folder = self
            .folders
            .find_folder_by_type_and_capacity(folder_type_id, sheets_count)
            .await?;

        debug!(
            document_type_id = %document_type_id,
            folder_type_id = %folder_type_id,
            sheets = sheets_count,
            folder_id = ?folder.as_ref().map(|f| f.id),
            "Folder recommendation"
        );
        Ok(folder)
    }
}

/// Folder type that may hold documents of the given type.
///
/// Document type N is filed in folder type N.
pub fn eligible_folder_type(document_type_id: DocumentTypeId) -> FolderTypeId {
    FolderTypeId(document_type_id.get())
}
