//! Embedded schema migrations.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use paperhub_core::error::{AppError, ErrorKind};
use paperhub_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// One embedded migration and whether the database has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Timestamp version from the file name.
    pub version: i64,
    /// Description from the file name.
    pub description: String,
    /// Whether the migration has been applied successfully.
    pub applied: bool,
}

/// Applies pending migrations and returns the versions that were new.
pub async fn run_migrations(pool: &PgPool) -> AppResult<Vec<i64>> {
    let before = applied_versions(pool).await?;

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Persistence,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let applied: Vec<i64> = embedded()
        .map(|(version, _)| version)
        .filter(|version| !before.contains(version))
        .collect();
    info!(applied = ?applied, "Database migrations up to date");
    Ok(applied)
}

/// Every embedded migration, in version order, with its applied state.
pub async fn migration_status(pool: &PgPool) -> AppResult<Vec<MigrationStatus>> {
    let applied = applied_versions(pool).await?;
    Ok(embedded()
        .map(|(version, description)| MigrationStatus {
            version,
            description,
            applied: applied.contains(&version),
        })
        .collect())
}

fn embedded() -> impl Iterator<Item = (i64, String)> {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| (m.version, m.description.to_string()))
}

/// Versions recorded in sqlx's bookkeeping table; empty before the first run.
async fn applied_versions(pool: &PgPool) -> AppResult<HashSet<i64>> {
    let persistence = |e: sqlx::Error| {
        AppError::with_source(
            ErrorKind::Persistence,
            format!("Failed to read migration history: {e}"),
            e,
        )
    };

    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await
        .map_err(persistence)?;
    if !tracked {
        return Ok(HashSet::new());
    }

    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(pool)
        .await
        .map_err(persistence)?;
    Ok(versions.into_iter().collect())
}
