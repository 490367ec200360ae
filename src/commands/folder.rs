//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::Services;
use crate::output::{self, OutputFormat};
use paperhub_core::error::AppError;
use paperhub_core::types::{DocumentTypeId, FolderId, FolderTypeId};
use paperhub_entity::folder::{Folder, FolderUsage};
use paperhub_service::CreateFolderRequest;

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create an empty folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Folder type ID
        #[arg(short = 't', long = "type")]
        folder_type: i64,
        /// Sheet capacity (defaults to the configured capacity)
        #[arg(short, long)]
        sheets: Option<i32>,
    },
    /// Show a folder and its usage
    Get {
        /// Folder ID
        id: i64,
    },
    /// List folders
    List {
        /// Only folders of this type
        #[arg(short = 't', long = "type")]
        folder_type: Option<i64>,
    },
    /// Suggest a folder with room for a document
    Recommend {
        /// Document type ID
        #[arg(short = 't', long = "document-type")]
        document_type: i64,
        /// Number of sheets to place
        #[arg(short, long)]
        sheets: i32,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: i64,
    /// Folder type
    folder_type: i64,
    /// Name
    name: String,
    /// Used sheets
    used: i32,
    /// Capacity
    total: i32,
    /// Free sheets
    free: i32,
    /// Usage
    usage: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        let usage = FolderUsage::new(f);
        Self {
            id: f.id.get(),
            folder_type: f.folder_type_id.get(),
            name: f.name.clone(),
            used: usage.used_sheets,
            total: usage.total_sheets,
            free: usage.available_sheets,
            usage: format!("{:.1}%", usage.usage_percent),
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FolderCommand::Create {
            name,
            folder_type,
            sheets,
        } => {
            let folder = services
                .folders
                .create_folder(CreateFolderRequest {
                    name: name.clone(),
                    folder_type_id: FolderTypeId(*folder_type),
                    total_sheets: *sheets,
                })
                .await?;
            output::print_success(&format!(
                "Folder '{}' created (id: {}, {} sheets)",
                folder.name, folder.id, folder.total_sheets
            ));
        }
        FolderCommand::Get { id } => {
            let folder = services.folders.get_folder(FolderId(*id)).await?;
            output::print_item(&FolderRow::from(&folder), format)?;
        }
        FolderCommand::List { folder_type } => {
            let folders = services
                .folders
                .list_folders(folder_type.map(FolderTypeId))
                .await?;
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format)?;
        }
        FolderCommand::Recommend {
            document_type,
            sheets,
        } => {
            match services
                .folders
                .recommend_folder(DocumentTypeId(*document_type), *sheets)
                .await?
            {
                Some(folder) => output::print_item(&FolderRow::from(&folder), format)?,
                None => output::print_warning(&format!(
                    "No folder of type {} has {} free sheets",
                    document_type, sheets
                )),
            }
        }
    }

    Ok(())
}
