//! PostgreSQL implementations of the storage collaborator traits.

pub mod document;
pub mod folder;

pub use document::DocumentRepository;
pub use folder::FolderRepository;
