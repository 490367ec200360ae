//! # paperhub-database
//!
//! The storage collaborator used by the PaperHub services: the
//! [`FolderStore`] / [`DocumentStore`] traits, the PostgreSQL repository
//! adapters, and an in-process [`MemoryStore`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{DocumentStore, FolderStore};
