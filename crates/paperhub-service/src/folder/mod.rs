//! Folder administration, recommendation, and usage reconciliation.

pub mod reconcile;
pub mod service;

pub use reconcile::{UsageDrift, UsageReconciler};
pub use service::{CreateFolderRequest, FolderService};
