//! Folder domain entities.

pub mod model;
pub mod usage;

pub use model::{CreateFolder, Folder};
pub use usage::FolderUsage;
