//! Document lifecycle coordination.

pub mod request;
pub mod service;

pub use request::{CreateDocumentRequest, UpdateDocumentRequest};
pub use service::DocumentService;
