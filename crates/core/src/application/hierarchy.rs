// Hierarchy Manager - get-or-create for Process / Job records

use crate::application::index::HierarchyIndex;
use crate::domain::{normalize_name, DomainError, Job, Process};
use crate::error::Result;
use crate::port::{IdProvider, ProcessRepository, TimeProvider};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Resolves process / job names to persisted records, creating them on first reference
///
/// Names are normalized on every lookup and create path, so differently
/// cased references share one index slot and one row. The index is
/// consulted before storage; every fetched or created record is indexed.
pub struct HierarchyManager {
    repo: Arc<dyn ProcessRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    index: Mutex<HierarchyIndex>,
}

impl HierarchyManager {
    pub fn new(
        repo: Arc<dyn ProcessRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self::with_index(repo, id_provider, time_provider, HierarchyIndex::new())
    }

    /// Create a manager seeded with an existing index
    pub fn with_index(
        repo: Arc<dyn ProcessRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        index: HierarchyIndex,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
            index: Mutex::new(index),
        }
    }

    // Index holds plain data; a panic elsewhere cannot leave it half-written
    fn index(&self) -> MutexGuard<'_, HierarchyIndex> {
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current index
    pub fn index_snapshot(&self) -> HierarchyIndex {
        self.index().clone()
    }

    /// Find a process by name without creating it
    pub async fn get_process(&self, name: &str) -> Result<Option<Process>> {
        let name = normalize_name(name);
        self.lookup_process(&name).await
    }

    /// Get or create a process
    pub async fn create_process(&self, raw_name: &str) -> Result<Process> {
        let name = normalize_name(raw_name);
        if name.is_empty() {
            return Err(DomainError::EmptyName(raw_name.to_string()).into());
        }

        if let Some(existing) = self.lookup_process(&name).await? {
            return Ok(existing);
        }

        let process = Process::new(
            self.id_provider.generate_id(),
            name.clone(),
            self.time_provider.now_millis(),
        );

        match self.repo.insert_process(&process).await {
            Ok(()) => {
                debug!(process_id = %process.id, name = %process.name, "Created process");
                self.index().insert_process(process.clone());
                Ok(process)
            }
            Err(e) if e.is_conflict() => {
                warn!(name = %name, "Process created concurrently, re-fetching");
                self.lookup_process(&name).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Find a job of `process` by name without creating it
    pub async fn get_job(&self, process: &Process, name: &str) -> Result<Option<Job>> {
        let name = normalize_name(name);
        self.lookup_job(process, &name).await
    }

    /// Get or create a job under `process`
    pub async fn create_job(&self, process: &Process, raw_name: &str) -> Result<Job> {
        let name = normalize_name(raw_name);
        if name.is_empty() {
            return Err(DomainError::EmptyName(raw_name.to_string()).into());
        }

        if let Some(existing) = self.lookup_job(process, &name).await? {
            return Ok(existing);
        }

        let job = Job::new(
            self.id_provider.generate_id(),
            process,
            name.clone(),
            self.time_provider.now_millis(),
        );

        match self.repo.insert_job(&job).await {
            Ok(()) => {
                debug!(
                    process_id = %process.id,
                    job_id = %job.id,
                    name = %job.name,
                    "Created job"
                );
                self.index().insert_job(process, job.clone());
                Ok(job)
            }
            Err(e) if e.is_conflict() => {
                warn!(process_id = %process.id, name = %name, "Job created concurrently, re-fetching");
                self.lookup_job(process, &name).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve process and job in one call, creating either if absent
    pub async fn resolve(&self, process_name: &str, job_name: &str) -> Result<(Process, Job)> {
        let process = self.create_process(process_name).await?;
        let job = self.create_job(&process, job_name).await?;
        Ok((process, job))
    }

    /// All stored processes (indexed as a side effect)
    pub async fn list_processes(&self) -> Result<Vec<Process>> {
        let processes = self.repo.list_processes().await?;
        let mut index = self.index();
        for process in &processes {
            index.insert_process(process.clone());
        }
        Ok(processes)
    }

    /// All stored jobs of `process` (indexed as a side effect)
    pub async fn list_jobs(&self, process: &Process) -> Result<Vec<Job>> {
        let jobs = self.repo.list_jobs(&process.id).await?;
        let mut index = self.index();
        for job in &jobs {
            index.insert_job(process, job.clone());
        }
        Ok(jobs)
    }

    async fn lookup_process(&self, name: &str) -> Result<Option<Process>> {
        let cached = self.index().process(name).cloned();
        if let Some(process) = cached {
            debug!(name = %name, "Process index hit");
            return Ok(Some(process));
        }

        debug!(name = %name, "Process index miss, querying storage");
        let found = self.repo.find_process_by_name(name).await?;
        if let Some(process) = &found {
            self.index().insert_process(process.clone());
        }
        Ok(found)
    }

    async fn lookup_job(&self, process: &Process, name: &str) -> Result<Option<Job>> {
        let cached = self.index().job(&process.id, name).cloned();
        if let Some(job) = cached {
            debug!(process_id = %process.id, name = %name, "Job index hit");
            return Ok(Some(job));
        }

        debug!(process_id = %process.id, name = %name, "Job index miss, querying storage");
        let found = self.repo.find_job(&process.id, name).await?;
        if let Some(job) = &found {
            self.index().insert_job(process, job.clone());
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::process_repository::mocks::InMemoryProcessRepository;
    use crate::port::time_provider::mocks::SteppingTimeProvider;

    fn manager_over(repo: Arc<InMemoryProcessRepository>) -> HierarchyManager {
        HierarchyManager::new(
            repo,
            Arc::new(SequentialIdProvider::default()),
            Arc::new(SteppingTimeProvider::default()),
        )
    }

    #[tokio::test]
    async fn test_create_process_twice_inserts_once() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let manager = manager_over(repo.clone());

        let first = manager.create_process("Foo").await.unwrap();
        let second = manager.create_process("Foo").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "foo");
        assert_eq!(repo.insert_count(), 1);
        assert_eq!(repo.process_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_normalizes_name() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let manager = manager_over(repo.clone());

        let created = manager.create_process("Nightly Backup").await.unwrap();
        let lookups_after_create = repo.lookup_count();

        let found = manager.get_process("  NIGHTLY--backup ").await.unwrap();
        assert_eq!(found, Some(created));
        // Served from the index
        assert_eq!(repo.lookup_count(), lookups_after_create);
    }

    #[tokio::test]
    async fn test_get_process_absent_creates_nothing() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let manager = manager_over(repo.clone());

        assert!(manager.get_process("ghost").await.unwrap().is_none());
        assert_eq!(repo.insert_count(), 0);
        assert_eq!(manager.index_snapshot().process_count(), 0);
    }

    #[tokio::test]
    async fn test_fresh_session_fetches_from_storage_and_indexes() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let created = manager_over(repo.clone()).create_process("report").await.unwrap();

        let other = manager_over(repo.clone());
        let before = repo.lookup_count();
        let found = other.get_process("report").await.unwrap();
        assert_eq!(found.as_ref(), Some(&created));
        assert_eq!(repo.lookup_count(), before + 1);

        // Second lookup hits the index
        other.get_process("report").await.unwrap();
        assert_eq!(repo.lookup_count(), before + 1);
    }

    #[tokio::test]
    async fn test_create_job_scoped_by_process() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let manager = manager_over(repo.clone());

        let a = manager.create_process("alpha").await.unwrap();
        let b = manager.create_process("beta").await.unwrap();

        let build_a1 = manager.create_job(&a, "Build").await.unwrap();
        let build_a2 = manager.create_job(&a, "build").await.unwrap();
        let build_b = manager.create_job(&b, "Build").await.unwrap();

        assert_eq!(build_a1.id, build_a2.id);
        assert_ne!(build_a1.id, build_b.id);
        assert_eq!(build_a1.process, a.id);
        assert_eq!(build_b.process, b.id);
        assert_eq!(repo.job_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_job_fetch_indexes_owning_process() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let (process, job) = manager_over(repo.clone())
            .resolve("etl", "load")
            .await
            .unwrap();

        let other = manager_over(repo.clone());
        let found = other.get_job(&process, "load").await.unwrap();
        assert_eq!(found, Some(job));

        let index = other.index_snapshot();
        assert_eq!(index.process("etl"), Some(&process));
        assert_eq!(index.job_count(), 1);
    }

    #[tokio::test]
    async fn test_conflict_on_insert_refetches_winner() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let winner = manager_over(repo.clone()).create_process("race").await.unwrap();

        // Loser's lookup misses, so it attempts an insert and hits the unique constraint
        repo.miss_next_lookups(1);
        let loser = manager_over(repo.clone());
        let resolved = loser.create_process("race").await.unwrap();

        assert_eq!(resolved.id, winner.id);
        assert_eq!(repo.process_rows().len(), 1);
        assert_eq!(loser.index_snapshot().process("race"), Some(&winner));
    }

    #[tokio::test]
    async fn test_job_conflict_refetches_winner() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let (process, winner) = manager_over(repo.clone())
            .resolve("race", "step")
            .await
            .unwrap();

        repo.miss_next_lookups(1);
        let loser = manager_over(repo.clone());
        let resolved = loser.create_job(&process, "step").await.unwrap();

        assert_eq!(resolved.id, winner.id);
        assert_eq!(repo.job_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let manager = manager_over(repo.clone());

        let err = manager.create_process(" *.- ").await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::EmptyName(_))));
        assert_eq!(repo.insert_count(), 0);
    }

    #[tokio::test]
    async fn test_seeded_index_skips_storage() {
        let repo = Arc::new(InMemoryProcessRepository::new());
        let mut index = HierarchyIndex::new();
        let seeded = Process::new("seed-1", "seeded", 1);
        index.insert_process(seeded.clone());

        let manager = HierarchyManager::with_index(
            repo.clone(),
            Arc::new(SequentialIdProvider::default()),
            Arc::new(SteppingTimeProvider::default()),
            index,
        );

        assert_eq!(manager.create_process("Seeded").await.unwrap(), seeded);
        assert_eq!(repo.lookup_count(), 0);
        assert_eq!(repo.insert_count(), 0);
    }
}
