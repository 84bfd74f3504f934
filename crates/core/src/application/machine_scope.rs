// Machine-Scoped Accessor - append / query Log and Cache entries

use crate::domain::{
    CacheEntry, CacheScope, DomainError, Job, LogEntry, LogFilter, LogQuery, LogType, Process,
};
use crate::error::Result;
use crate::port::{EntryRepository, IdProvider, TimeProvider};
use std::sync::Arc;
use tracing::debug;

/// Appends log / cache entries tagged with one machine identifier
///
/// Cache reads are scoped to (process, job, machine). Log listings cover
/// every machine of the process or job.
pub struct MachineScopedAccessor {
    repo: Arc<dyn EntryRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    machine: String,
}

impl MachineScopedAccessor {
    pub fn new(
        repo: Arc<dyn EntryRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        machine: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
            machine: machine.into(),
        }
    }

    pub fn machine(&self) -> &str {
        &self.machine
    }

    fn scope(&self, process: &Process, job: &Job) -> Result<CacheScope> {
        ensure_owned(process, job)?;
        Ok(CacheScope {
            process: process.id.clone(),
            job: job.id.clone(),
            machine: self.machine.clone(),
        })
    }

    /// Append a log entry
    pub async fn create_log(
        &self,
        process: &Process,
        job: &Job,
        message: &str,
        log_type: LogType,
    ) -> Result<LogEntry> {
        ensure_owned(process, job)?;
        let now = self.time_provider.now_millis();

        let entry = LogEntry {
            id: self.id_provider.generate_id(),
            process: process.id.clone(),
            job: job.id.clone(),
            machine: self.machine.clone(),
            log_type,
            message: message.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_log(&entry).await?;
        debug!(job_id = %job.id, log_type = %log_type, "Appended log entry");
        Ok(entry)
    }

    /// Append a cache entry (never overwrites an existing key)
    pub async fn create_cache(
        &self,
        process: &Process,
        job: &Job,
        key: &str,
        value: &str,
    ) -> Result<CacheEntry> {
        ensure_owned(process, job)?;
        let now = self.time_provider.now_millis();

        let entry = CacheEntry {
            id: self.id_provider.generate_id(),
            process: process.id.clone(),
            job: job.id.clone(),
            machine: self.machine.clone(),
            key: key.to_string(),
            value: value.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_cache(&entry).await?;
        debug!(job_id = %job.id, key = %key, "Appended cache entry");
        Ok(entry)
    }

    /// All entries for `key`, oldest first
    pub async fn get_cache(
        &self,
        process: &Process,
        job: &Job,
        key: &str,
    ) -> Result<Vec<CacheEntry>> {
        let scope = self.scope(process, job)?;
        self.repo.find_cache(&scope, Some(key)).await
    }

    /// Every cache entry in scope, oldest first
    pub async fn get_all_cache(&self, process: &Process, job: &Job) -> Result<Vec<CacheEntry>> {
        let scope = self.scope(process, job)?;
        self.repo.find_cache(&scope, None).await
    }

    pub async fn has_cache_key(&self, process: &Process, job: &Job, key: &str) -> Result<bool> {
        let scope = self.scope(process, job)?;
        Ok(self.repo.count_cache(&scope, Some(key)).await? > 0)
    }

    pub async fn has_cache(&self, process: &Process, job: &Job) -> Result<bool> {
        let scope = self.scope(process, job)?;
        Ok(self.repo.count_cache(&scope, None).await? > 0)
    }

    /// Logs of every job of `process`, oldest first
    pub async fn get_process_logs(
        &self,
        process: &Process,
        filter: LogFilter,
    ) -> Result<Vec<LogEntry>> {
        let query = LogQuery {
            process: process.id.clone(),
            job: None,
            filter,
        };
        self.repo.find_logs(&query).await
    }

    /// Logs of one job, oldest first
    pub async fn get_job_logs(
        &self,
        process: &Process,
        job: &Job,
        filter: LogFilter,
    ) -> Result<Vec<LogEntry>> {
        ensure_owned(process, job)?;
        let query = LogQuery {
            process: process.id.clone(),
            job: Some(job.id.clone()),
            filter,
        };
        self.repo.find_logs(&query).await
    }
}

fn ensure_owned(process: &Process, job: &Job) -> Result<()> {
    if job.belongs_to(process) {
        Ok(())
    } else {
        Err(DomainError::ForeignJob {
            process: process.id.clone(),
            job: job.id.clone(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::entry_repository::mocks::InMemoryEntryRepository;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::time_provider::mocks::{FrozenTimeProvider, SteppingTimeProvider};

    fn fixtures() -> (Process, Job) {
        let process = Process::new("p1", "sync", 1);
        let job = Job::new("j1", &process, "pull", 1);
        (process, job)
    }

    fn accessor(repo: Arc<InMemoryEntryRepository>, machine: &str) -> MachineScopedAccessor {
        MachineScopedAccessor::new(
            repo,
            Arc::new(SequentialIdProvider::new(machine)),
            Arc::new(SteppingTimeProvider::default()),
            machine,
        )
    }

    #[tokio::test]
    async fn test_cache_is_append_only() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let acc = accessor(repo.clone(), "host-a");
        let (p, j) = fixtures();

        acc.create_cache(&p, &j, "k", "v1").await.unwrap();
        acc.create_cache(&p, &j, "k", "v2").await.unwrap();

        let values: Vec<String> = acc
            .get_cache(&p, &j, "k")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec!["v1", "v2"]);
        assert_eq!(repo.cache_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_has_cache_flips_after_first_write() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let acc = accessor(repo, "host-a");
        let (p, j) = fixtures();

        assert!(!acc.has_cache(&p, &j).await.unwrap());
        assert!(!acc.has_cache_key(&p, &j, "cursor").await.unwrap());

        acc.create_cache(&p, &j, "cursor", "42").await.unwrap();

        assert!(acc.has_cache(&p, &j).await.unwrap());
        assert!(acc.has_cache_key(&p, &j, "cursor").await.unwrap());
        assert!(!acc.has_cache_key(&p, &j, "other").await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_scoped_by_machine() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let a = accessor(repo.clone(), "host-a");
        let b = accessor(repo.clone(), "host-b");
        let (p, j) = fixtures();

        a.create_cache(&p, &j, "k", "from-a").await.unwrap();

        assert!(a.has_cache(&p, &j).await.unwrap());
        assert!(!b.has_cache(&p, &j).await.unwrap());
        assert!(b.get_cache(&p, &j, "k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_job_logs_filter_and_page() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let acc = accessor(repo, "host-a");
        let (p, j) = fixtures();

        acc.create_log(&p, &j, "start", LogType::Generic).await.unwrap();
        acc.create_log(&p, &j, "slow", LogType::Warning).await.unwrap();
        acc.create_log(&p, &j, "boom", LogType::Error).await.unwrap();
        acc.create_log(&p, &j, "slower", LogType::Warning).await.unwrap();

        let all = acc.get_job_logs(&p, &j, LogFilter::default()).await.unwrap();
        let messages: Vec<&str> = all.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["start", "slow", "boom", "slower"]);

        let warnings = acc
            .get_job_logs(&p, &j, LogFilter::of_type(LogType::Warning))
            .await
            .unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|l| l.log_type == LogType::Warning));

        let page = acc.get_job_logs(&p, &j, LogFilter::page(1, 2)).await.unwrap();
        let messages: Vec<&str> = page.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["slow", "boom"]);
    }

    #[tokio::test]
    async fn test_process_logs_span_jobs_in_creation_order() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let acc = accessor(repo, "host-a");
        let (p, first) = fixtures();
        let second = Job::new("j2", &p, "push", 1);

        acc.create_log(&p, &first, "one", LogType::Generic).await.unwrap();
        acc.create_log(&p, &second, "two", LogType::Generic).await.unwrap();
        acc.create_log(&p, &first, "three", LogType::Generic).await.unwrap();

        let logs = acc.get_process_logs(&p, LogFilter::default()).await.unwrap();
        let messages: Vec<&str> = logs.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two", "three"]);
        assert!(logs.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_same_timestamp_keeps_append_order() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let acc = MachineScopedAccessor::new(
            repo,
            Arc::new(SequentialIdProvider::default()),
            Arc::new(FrozenTimeProvider(5000)),
            "host-a",
        );
        let (p, j) = fixtures();

        for v in ["a", "b", "c"] {
            acc.create_cache(&p, &j, "k", v).await.unwrap();
        }

        let values: Vec<String> = acc
            .get_cache(&p, &j, "k")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_foreign_job_rejected() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        let acc = accessor(repo.clone(), "host-a");
        let (p, _) = fixtures();
        let other = Process::new("p2", "other", 1);
        let foreign = Job::new("j9", &other, "x", 1);

        let err = acc.create_cache(&p, &foreign, "k", "v").await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::ForeignJob { .. })));
        assert!(repo.cache_rows().is_empty());
    }
}
