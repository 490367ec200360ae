//! Core type definitions used across the PaperHub workspace.

pub mod id;
pub mod patch;

pub use id::*;
pub use patch::Patch;
