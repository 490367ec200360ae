//! # paperhub-entity
//!
//! Domain entity models for PaperHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod document;
pub mod folder;

pub use document::{Document, NewDocument};
pub use folder::{CreateFolder, Folder, FolderUsage};
