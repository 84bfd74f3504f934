// SQLite ProcessRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use recall_core::domain::{EntityId, Job, Process};
use recall_core::error::Result;
use recall_core::port::ProcessRepository;
use sqlx::SqlitePool;

pub struct SqliteProcessRepository {
    pool: SqlitePool,
}

impl SqliteProcessRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessRepository for SqliteProcessRepository {
    async fn find_process_by_name(&self, name: &str) -> Result<Option<Process>> {
        let row = sqlx::query_as::<_, ProcessRow>(
            "SELECT id, name, created_at, updated_at FROM processes WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProcessRow::into_process))
    }

    async fn insert_process(&self, process: &Process) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO processes (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&process.id)
        .bind(&process.name)
        .bind(process.created_at)
        .bind(process.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_job(&self, process_id: &EntityId, name: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, process, name, created_at, updated_at
            FROM process_jobs
            WHERE process = ? AND name = ?
            "#,
        )
        .bind(process_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(JobRow::into_job))
    }

    async fn insert_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO process_jobs (id, process, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.process)
        .bind(&job.name)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_processes(&self) -> Result<Vec<Process>> {
        let rows: Vec<ProcessRow> = sqlx::query_as(
            r#"
            SELECT id, name, created_at, updated_at
            FROM processes
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProcessRow::into_process).collect())
    }

    async fn list_jobs(&self, process_id: &EntityId) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT id, process, name, created_at, updated_at
            FROM process_jobs
            WHERE process = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(process_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(JobRow::into_job).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProcessRow {
    id: String,
    name: String,
    created_at: i64,
    updated_at: i64,
}

impl ProcessRow {
    fn into_process(self) -> Process {
        Process {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    process: String,
    name: String,
    created_at: i64,
    updated_at: i64,
}

impl JobRow {
    fn into_job(self) -> Job {
        Job {
            id: self.id,
            process: self.process,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
