// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use recall_core::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create SQLite connection pool with WAL mode and foreign keys enabled
///
/// In-memory databases get a single long-lived connection, since every
/// SQLite connection would otherwise open its own empty database.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_in_memory(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(map_sqlx_error)?
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    debug!(database_url = %database_url, in_memory, "SQLite pool ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory(":memory:"));
        assert!(!is_in_memory("/var/lib/recall/recall.db"));
    }
}
