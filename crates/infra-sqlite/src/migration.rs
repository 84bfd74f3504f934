// Migration Runner (schema provisioning for the four Recall tables)

use crate::error::map_sqlx_error;
use recall_core::error::Result;
use sqlx::SqlitePool;
use tracing::info;

struct Migration {
    version: i64,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema",
    sql: include_str!("../migrations/001_initial_schema.sql"),
}];

pub const LATEST_SCHEMA_VERSION: i64 = 1;

/// Applied schema version (0 when nothing has been provisioned)
pub async fn current_schema_version(pool: &SqlitePool) -> Result<i64> {
    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)?;

    if table_exists == 0 {
        return Ok(0);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx_error)?;

    Ok(version.unwrap_or(0))
}

/// Run database migrations
///
/// Idempotent: already-applied versions are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    let current_version = current_schema_version(pool).await?;
    info!("Current schema version: {}", current_version);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            "Applying migration {:03}: {}",
            migration.version, migration.description
        );
        apply_migration(pool, migration.sql).await?;
    }

    info!("All migrations applied successfully");
    Ok(())
}

/// Apply a single migration SQL file
async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<()> {
    // Execute migration in a transaction
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;

    // Split by semicolon and execute each statement
    for statement in sql.split(';') {
        // Remove comments and trim
        let clean_statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        if !clean_statement.is_empty() {
            sqlx::query(&clean_statement)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }
    }

    tx.commit().await.map_err(map_sqlx_error)?;
    Ok(())
}
