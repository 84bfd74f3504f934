// SQLite EntryRepository Implementation (process_job_logs / process_cache)

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use recall_core::domain::{CacheEntry, CacheScope, LogEntry, LogQuery, LogType};
use recall_core::error::Result;
use recall_core::port::EntryRepository;
use sqlx::SqlitePool;

pub struct SqliteEntryRepository {
    pool: SqlitePool,
}

impl SqliteEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for SqliteEntryRepository {
    async fn insert_log(&self, entry: &LogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO process_job_logs (
                id, process, job, machine, "type", message, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.process)
        .bind(&entry.job)
        .bind(&entry.machine)
        .bind(entry.log_type.as_str())
        .bind(&entry.message)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let log_type = query.filter.log_type.map(|t| t.as_str());
        // SQLite: negative LIMIT means unbounded
        let limit = query.filter.limit.map_or(-1, i64::from);
        let offset = query.filter.offset.map_or(0, i64::from);

        let rows: Vec<LogRow> = sqlx::query_as(
            r#"
            SELECT id, process, job, machine, "type" AS log_type, message, created_at, updated_at
            FROM process_job_logs
            WHERE process = ?
              AND (? IS NULL OR job = ?)
              AND (? IS NULL OR "type" = ?)
            ORDER BY created_at ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&query.process)
        .bind(&query.job)
        .bind(&query.job)
        .bind(log_type)
        .bind(log_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(LogRow::into_entry).collect()
    }

    async fn insert_cache(&self, entry: &CacheEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO process_cache (
                id, process, job, machine, "key", "value", created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.process)
        .bind(&entry.job)
        .bind(&entry.machine)
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_cache(
        &self,
        scope: &CacheScope,
        key: Option<&str>,
    ) -> Result<Vec<CacheEntry>> {
        let rows: Vec<CacheRow> = sqlx::query_as(
            r#"
            SELECT id, process, job, machine, "key", "value", created_at, updated_at
            FROM process_cache
            WHERE process = ? AND job = ? AND machine = ?
              AND (? IS NULL OR "key" = ?)
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(&scope.process)
        .bind(&scope.job)
        .bind(&scope.machine)
        .bind(key)
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CacheRow::into_entry).collect())
    }

    async fn count_cache(&self, scope: &CacheScope, key: Option<&str>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM process_cache
            WHERE process = ? AND job = ? AND machine = ?
              AND (? IS NULL OR "key" = ?)
            "#,
        )
        .bind(&scope.process)
        .bind(&scope.job)
        .bind(&scope.machine)
        .bind(key)
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation of process_job_logs
#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: String,
    process: String,
    job: String,
    machine: String,
    log_type: String,
    message: String,
    created_at: i64,
    updated_at: i64,
}

impl LogRow {
    fn into_entry(self) -> Result<LogEntry> {
        let log_type: LogType = self.log_type.parse()?;

        Ok(LogEntry {
            id: self.id,
            process: self.process,
            job: self.job,
            machine: self.machine,
            log_type,
            message: self.message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite row representation of process_cache
#[derive(Debug, sqlx::FromRow)]
struct CacheRow {
    id: String,
    process: String,
    job: String,
    machine: String,
    key: String,
    value: String,
    created_at: i64,
    updated_at: i64,
}

impl CacheRow {
    fn into_entry(self) -> CacheEntry {
        CacheEntry {
            id: self.id,
            process: self.process,
            job: self.job,
            machine: self.machine,
            key: self.key,
            value: self.value,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
