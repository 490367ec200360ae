//! # paperhub-core
//!
//! Core crate for PaperHub. Contains configuration schemas, typed
//! identifiers, the three-state [`types::Patch`] value, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other PaperHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
