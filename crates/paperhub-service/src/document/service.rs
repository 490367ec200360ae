//! Document lifecycle: every create, update, and delete keeps the owning
//! folders' `used_sheets` in step with the documents filed in them.
//!
//! Storage gives no cross-entity atomicity, so each operation records the
//! folder writes it has made and reverts them if a later write fails. The
//! one documented exception is a move rejected for capacity: the sheets
//! already released from the previous folder stay released, and the
//! operation reports `InsufficientCapacity`. Moves are therefore not
//! atomic; [`UsageReconciler`](crate::folder::UsageReconciler) repairs the
//! resulting drift.
//!
//! The lock registries only order writers inside one process. Counter and
//! document writes are also conditional on the row that was read, so a
//! writer in another process that got there first makes the write come
//! back empty: counter writes re-read and re-check, document writes fail
//! with `Conflict`.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use paperhub_core::config::CapacityConfig;
use paperhub_core::error::{AppError, ErrorKind};
use paperhub_core::result::AppResult;
use paperhub_core::types::{DocumentId, DocumentTypeId, FolderId};
use paperhub_database::store::{DocumentStore, FolderStore};
use paperhub_entity::document::{Document, NewDocument};
use paperhub_entity::folder::Folder;

use super::request::{self, CreateDocumentRequest, UpdateDocumentRequest};
use crate::ledger::{self, Placement};
use crate::lock::{DocumentLocks, FolderLocks};

/// A folder write made during the current operation: the folder as
/// written, and the delta that produced it.
type Applied = (Folder, i32);

/// Counter writes attempted before giving up with `Conflict`.
///
/// Every lost attempt means another writer's write landed in between.
const MAX_COUNTER_WRITES: usize = 16;

/// Coordinates document writes with folder capacity.
#[derive(Debug, Clone)]
pub struct DocumentService {
    /// Document persistence.
    documents: Arc<dyn DocumentStore>,
    /// Folder persistence.
    folders: Arc<dyn FolderStore>,
    /// Per-folder serialization, shared with other capacity writers.
    folder_locks: FolderLocks,
    /// Per-document serialization, shared with other document writers.
    document_locks: DocumentLocks,
    /// Capacity defaults.
    config: CapacityConfig,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        folders: Arc<dyn FolderStore>,
        folder_locks: FolderLocks,
        document_locks: DocumentLocks,
        config: CapacityConfig,
    ) -> Self {
        Self {
            documents,
            folders,
            folder_locks,
            document_locks,
            config,
        }
    }

    /// Creates a document, reserving its sheets in the target folder first.
    ///
    /// Fails with `NotFound` if the folder does not exist and with
    /// `InsufficientCapacity` if it cannot take the sheets. If the document
    /// insert fails after the reservation, the reservation is released
    /// again before the error is returned.
    pub async fn create_document(&self, req: CreateDocumentRequest) -> AppResult<Document> {
        request::check(&req, Some(&req.title))?;

        let data = NewDocument {
            title: req.title,
            sheets_count: req.sheets_count,
            folder_id: req.folder_id,
            document_type_id: req
                .document_type_id
                .unwrap_or(DocumentTypeId(self.config.default_document_type_id)),
        };

        let Some(folder_id) = data.folder_id else {
            let document = self.documents.create_document(&data).await?;
            info!(
                document_id = %document.id,
                sheets = document.sheets_count,
                "Unassigned document created"
            );
            return Ok(document);
        };

        let _guard = self.folder_locks.lock(folder_id).await;

        let folder = self.load_folder(folder_id).await?;
        let reserved = self.commit(&folder, data.sheets_count).await?;

        match self.documents.create_document(&data).await {
            Ok(document) => {
                info!(
                    document_id = %document.id,
                    folder_id = %folder_id,
                    sheets = document.sheets_count,
                    used_sheets = reserved.used_sheets,
                    "Document created"
                );
                Ok(document)
            }
            Err(e) => Err(self.revert(vec![(reserved, data.sheets_count)], e).await),
        }
    }

    /// Gets a document by ID.
    pub async fn get_document(&self, id: DocumentId) -> AppResult<Document> {
        self.documents
            .get_document_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    /// Lists the documents filed in a folder.
    pub async fn list_documents(&self, folder_id: FolderId) -> AppResult<Vec<Document>> {
        self.load_folder(folder_id).await?;
        self.documents.list_documents_by_folder(folder_id).await
    }

    /// Applies a partial update, moving the document's reservation as needed.
    ///
    /// Sheets are released from the previous folder before the new folder
    /// is fit-checked. When that check fails the release stays committed
    /// and `InsufficientCapacity` is returned; any other failure after a
    /// folder write reverts the writes made so far.
    pub async fn update_document(
        &self,
        id: DocumentId,
        req: UpdateDocumentRequest,
    ) -> AppResult<Document> {
        request::check(&req, req.title.as_deref())?;

        let _doc_guard = self.document_locks.lock(id).await;
        let document = self.get_document(id).await?;
        if req.is_empty() {
            return Ok(document);
        }

        let before = Placement::new(document.folder_id, document.sheets_count);
        let after = Placement::new(
            req.folder_id.resolve(document.folder_id),
            req.sheets_count.unwrap_or(document.sheets_count),
        );
        let transition = ledger::delta_for_transition(before, after);
        let _folder_guards = self.folder_locks.lock_all(transition.folders()).await;

        let target = match transition.reserve_into {
            Some(reserve) => Some(self.load_folder(reserve.folder_id).await?),
            None => None,
        };

        let mut applied: Vec<Applied> = Vec::new();

        if let Some(release) = transition.free_from {
            match self.folders.get_folder_by_id(release.folder_id).await? {
                Some(source) => {
                    let freed = self.commit(&source, -release.sheets).await?;
                    applied.push((freed, -release.sheets));
                }
                None => warn!(
                    document_id = %id,
                    folder_id = %release.folder_id,
                    "Previous folder no longer exists, nothing to release"
                ),
            }
        }

        if let (Some(reserve), Some(target)) = (transition.reserve_into, target) {
            match self.commit(&target, reserve.sheets).await {
                Ok(reserved) => applied.push((reserved, reserve.sheets)),
                Err(e) if e.kind() == ErrorKind::InsufficientCapacity => {
                    if !applied.is_empty() {
                        warn!(
                            document_id = %id,
                            from = ?before.folder_id,
                            to = %target.id,
                            "Move rejected after releasing sheets from the previous folder"
                        );
                    }
                    return Err(e);
                }
                Err(e) => return Err(self.revert(applied, e).await),
            }
        }

        let mut next = document.clone();
        if let Some(title) = req.title {
            next.title = title;
        }
        next.sheets_count = after.sheets;
        next.folder_id = after.folder_id;

        match self.documents.update_document(&document, &next).await {
            Ok(Some(updated)) => {
                info!(
                    document_id = %id,
                    from = ?before.folder_id,
                    to = ?after.folder_id,
                    sheets = after.sheets,
                    "Document updated"
                );
                Ok(updated)
            }
            Ok(None) => {
                let cause = AppError::conflict(format!(
                    "Document {id} was changed by another writer, retry the update"
                ));
                Err(self.revert(applied, cause).await)
            }
            Err(e) => Err(self.revert(applied, e).await),
        }
    }

    /// Deletes a document and releases its sheets.
    ///
    /// A failure to release the folder's sheets is logged and the delete
    /// goes ahead anyway.
    pub async fn delete_document(&self, id: DocumentId) -> AppResult<()> {
        let _doc_guard = self.document_locks.lock(id).await;
        let document = self.get_document(id).await?;

        let _folder_guard = match document.folder_id {
            Some(folder_id) => Some(self.folder_locks.lock(folder_id).await),
            None => None,
        };

        let released = match document.folder_id {
            Some(folder_id) => self.release_best_effort(&document, folder_id).await,
            None => None,
        };

        let deleted = match self.documents.delete_document(id).await {
            Ok(deleted) => deleted,
            Err(e) => return Err(self.revert(released.into_iter().collect(), e).await),
        };
        if !deleted {
            let cause = AppError::not_found(format!("Document {id} not found"));
            return Err(self.revert(released.into_iter().collect(), cause).await);
        }

        info!(
            document_id = %id,
            folder_id = ?document.folder_id,
            sheets = document.sheets_count,
            "Document deleted"
        );
        Ok(())
    }

    /// Releases a deleted document's sheets, logging instead of failing.
    async fn release_best_effort(&self, document: &Document, folder_id: FolderId) -> Option<Applied> {
        let folder = match self.folders.get_folder_by_id(folder_id).await {
            Ok(Some(folder)) => folder,
            Ok(None) => {
                warn!(
                    document_id = %document.id,
                    folder_id = %folder_id,
                    "Folder of deleted document no longer exists"
                );
                return None;
            }
            Err(e) => {
                warn!(
                    document_id = %document.id,
                    folder_id = %folder_id,
                    error = %e,
                    "Could not load folder to release sheets, deleting anyway"
                );
                return None;
            }
        };

        match self.commit(&folder, -document.sheets_count).await {
            Ok(freed) => Some((freed, -document.sheets_count)),
            Err(e) => {
                warn!(
                    document_id = %document.id,
                    folder_id = %folder_id,
                    error = %e,
                    "Could not release sheets, deleting anyway"
                );
                None
            }
        }
    }

    async fn load_folder(&self, id: FolderId) -> AppResult<Folder> {
        self.folders
            .get_folder_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Shifts a folder's counter through the ledger and writes it back.
    ///
    /// Reservations are fit-checked against the snapshot being written. If
    /// the stored counter moved since `folder` was read, the folder is
    /// re-read and the check and write are repeated.
    async fn commit(&self, folder: &Folder, delta: i32) -> AppResult<Folder> {
        let mut current = folder.clone();

        for attempt in 1..=MAX_COUNTER_WRITES {
            if delta > 0 && !ledger::fits(&current, delta) {
                return Err(no_room(&current, delta));
            }
            let next = ledger::apply_delta(&current, delta).inspect_err(|e| {
                error!(
                    folder_id = %current.id,
                    used_sheets = current.used_sheets,
                    total_sheets = current.total_sheets,
                    delta,
                    error = %e,
                    "Folder capacity invariant violated"
                );
            })?;

            if let Some(written) = self.folders.update_folder(&current, next.used_sheets).await? {
                return Ok(written);
            }
            debug!(
                folder_id = %current.id,
                attempt,
                "Folder counter changed by another writer, re-reading"
            );
            current = self.load_folder(current.id).await?;
        }

        Err(AppError::conflict(format!(
            "Folder {} kept changing under concurrent writers, gave up after {MAX_COUNTER_WRITES} attempts",
            folder.id
        )))
    }

    /// Undoes folder writes in reverse order and returns the error to report.
    async fn revert(&self, applied: Vec<Applied>, cause: AppError) -> AppError {
        for (folder, delta) in applied.into_iter().rev() {
            match self.commit(&folder, -delta).await {
                Ok(_) => warn!(
                    folder_id = %folder.id,
                    delta = -delta,
                    cause = %cause,
                    "Reverted folder usage"
                ),
                Err(undo) => {
                    error!(
                        folder_id = %folder.id,
                        delta = -delta,
                        cause = %cause,
                        error = %undo,
                        "Reverting folder usage failed, folder may be inconsistent"
                    );
                    let message = format!(
                        "{}; reverting folder {} also failed ({undo}), its used_sheets may be inconsistent",
                        cause.message, folder.id
                    );
                    return AppError::with_source(ErrorKind::Persistence, message, cause);
                }
            }
        }
        cause
    }
}

fn no_room(folder: &Folder, sheets: i32) -> AppError {
    AppError::insufficient_capacity(format!(
        "Folder {} has {} free sheets, {} requested",
        folder.id,
        folder.free_sheets(),
        sheets
    ))
}
