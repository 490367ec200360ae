//! CLI command definitions and dispatch.

pub mod document;
pub mod folder;
pub mod migrate;
pub mod reconcile;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use paperhub_core::config::AppConfig;
use paperhub_core::error::AppError;
use paperhub_database::DatabasePool;
use paperhub_database::repositories::{DocumentRepository, FolderRepository};
use paperhub_database::store::{DocumentStore, FolderStore};
use paperhub_service::{DocumentLocks, DocumentService, FolderLocks, FolderService, UsageReconciler};

/// PaperHub: physical folders, their sheet capacity, and the documents filed in them
#[derive(Debug, Parser)]
#[command(name = "paperhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Folder management and recommendations
    Folder(folder::FolderArgs),
    /// Document lifecycle
    Document(document::DocumentArgs),
    /// Compare folder usage with filed documents
    Reconcile(reconcile::ReconcileArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        if !matches!(self.command, Commands::Migrate(_)) {
            if let Err(e) = pool.ensure_schema().await {
                pool.close().await;
                return Err(e);
            }
        }

        let result = match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &pool, self.format).await,
            Commands::Folder(args) => {
                folder::execute(args, &Services::new(&pool, config), self.format).await
            }
            Commands::Document(args) => {
                document::execute(args, &Services::new(&pool, config), self.format).await
            }
            Commands::Reconcile(args) => {
                reconcile::execute(args, &Services::new(&pool, config), self.format).await
            }
        };

        pool.close().await;
        result
    }
}

/// Services wired over the PostgreSQL repositories.
///
/// All capacity writers share one [`FolderLocks`]. The locks only cover
/// this process; other `paperhub` processes are kept in line by the
/// conditional writes in the repositories.
#[derive(Debug, Clone)]
pub struct Services {
    /// Folder administration and recommendations.
    pub folders: FolderService,
    /// Document lifecycle.
    pub documents: DocumentService,
    /// Usage drift repair.
    pub reconciler: UsageReconciler,
}

impl Services {
    /// Builds the services for one command invocation.
    pub fn new(pool: &DatabasePool, config: &AppConfig) -> Self {
        let folder_store: Arc<dyn FolderStore> = Arc::new(FolderRepository::new(pool.pool().clone()));
        let document_store: Arc<dyn DocumentStore> =
            Arc::new(DocumentRepository::new(pool.pool().clone()));
        let locks = FolderLocks::new();

        Self {
            folders: FolderService::new(Arc::clone(&folder_store), config.capacity.clone()),
            documents: DocumentService::new(
                Arc::clone(&document_store),
                Arc::clone(&folder_store),
                locks.clone(),
                DocumentLocks::new(),
                config.capacity.clone(),
            ),
            reconciler: UsageReconciler::new(folder_store, document_store, locks),
        }
    }
}
