//! # paperhub-service
//!
//! Business logic for PaperHub. The capacity ledger decides how folder
//! counters move; the services load, lock, check, and persist around it.
//!
//! Services follow constructor injection: storage is handed in as
//! `Arc<dyn FolderStore>` / `Arc<dyn DocumentStore>`, and every service that
//! writes `used_sheets` must share the same [`FolderLocks`].

pub mod document;
pub mod folder;
pub mod ledger;
pub mod lock;

pub use document::{CreateDocumentRequest, DocumentService, UpdateDocumentRequest};
pub use folder::{CreateFolderRequest, FolderService, UsageDrift, UsageReconciler};
pub use lock::{DocumentLocks, FolderLocks};
