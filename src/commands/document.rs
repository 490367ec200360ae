//! Document lifecycle CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::Services;
use crate::output::{self, OutputFormat};
use paperhub_core::error::AppError;
use paperhub_core::types::{DocumentId, DocumentTypeId, FolderId, Patch};
use paperhub_entity::document::Document;
use paperhub_service::{CreateDocumentRequest, UpdateDocumentRequest};

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document subcommand
    #[command(subcommand)]
    pub command: DocumentCommand,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// Create a document, optionally filing it in a folder
    Create {
        /// Document title
        #[arg(short, long)]
        title: String,
        /// Number of sheets
        #[arg(short, long)]
        sheets: i32,
        /// Folder to file it in
        #[arg(long)]
        folder: Option<i64>,
        /// Document type ID (defaults to the configured type)
        #[arg(long = "type")]
        document_type: Option<i64>,
    },
    /// Show a document
    Get {
        /// Document ID
        id: i64,
    },
    /// Change a document's title, size, or folder
    Update {
        /// Document ID
        id: i64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New sheet count
        #[arg(short, long)]
        sheets: Option<i32>,
        /// Move to this folder
        #[arg(long, conflicts_with = "unassign")]
        folder: Option<i64>,
        /// Take the document out of its folder
        #[arg(long)]
        unassign: bool,
    },
    /// Delete a document
    Delete {
        /// Document ID
        id: i64,
    },
    /// List the documents filed in a folder
    List {
        /// Folder ID
        #[arg(long)]
        folder: i64,
    },
}

/// Document display row
#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    /// Document ID
    id: i64,
    /// Title
    title: String,
    /// Sheets
    sheets: i32,
    /// Folder
    folder: String,
    /// Document type
    document_type: i64,
    /// Updated at
    updated_at: String,
}

impl From<&Document> for DocumentRow {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id.get(),
            title: d.title.clone(),
            sheets: d.sheets_count,
            folder: d
                .folder_id
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string()),
            document_type: d.document_type_id.get(),
            updated_at: d.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute document commands
pub async fn execute(
    args: &DocumentArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        DocumentCommand::Create {
            title,
            sheets,
            folder,
            document_type,
        } => {
            let document = services
                .documents
                .create_document(CreateDocumentRequest {
                    title: title.clone(),
                    sheets_count: *sheets,
                    folder_id: folder.map(FolderId),
                    document_type_id: document_type.map(DocumentTypeId),
                })
                .await?;
            output::print_item(&DocumentRow::from(&document), format)?;
        }
        DocumentCommand::Get { id } => {
            let document = services.documents.get_document(DocumentId(*id)).await?;
            output::print_item(&DocumentRow::from(&document), format)?;
        }
        DocumentCommand::Update {
            id,
            title,
            sheets,
            folder,
            unassign,
        } => {
            let folder_id = match (folder, unassign) {
                (_, true) => Patch::Clear,
                (Some(f), false) => Patch::Set(FolderId(*f)),
                (None, false) => Patch::Unchanged,
            };
            let document = services
                .documents
                .update_document(
                    DocumentId(*id),
                    UpdateDocumentRequest {
                        title: title.clone(),
                        sheets_count: *sheets,
                        folder_id,
                    },
                )
                .await?;
            output::print_item(&DocumentRow::from(&document), format)?;
        }
        DocumentCommand::Delete { id } => {
            services.documents.delete_document(DocumentId(*id)).await?;
            output::print_success(&format!("Document {id} deleted"));
        }
        DocumentCommand::List { folder } => {
            let documents = services.documents.list_documents(FolderId(*folder)).await?;
            let rows: Vec<DocumentRow> = documents.iter().map(DocumentRow::from).collect();
            output::print_list(&rows, format)?;
        }
    }

    Ok(())
}
