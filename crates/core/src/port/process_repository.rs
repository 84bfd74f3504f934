// Process Repository Port (Interface)

use crate::domain::{EntityId, Job, Process};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Process / Job persistence
///
/// Implementations must enforce uniqueness of `processes.name` and of
/// `(process, name)` for jobs, reporting a violation as `AppError::Conflict`.
#[async_trait]
pub trait ProcessRepository: Send + Sync {
    /// Find process by exact (already normalized) name
    async fn find_process_by_name(&self, name: &str) -> Result<Option<Process>>;

    /// Insert a new process
    async fn insert_process(&self, process: &Process) -> Result<()>;

    /// Find job by owning process and exact (already normalized) name
    async fn find_job(&self, process_id: &EntityId, name: &str) -> Result<Option<Job>>;

    /// Insert a new job
    async fn insert_job(&self, job: &Job) -> Result<()>;

    /// All processes, oldest first
    async fn list_processes(&self) -> Result<Vec<Process>>;

    /// All jobs of a process, oldest first
    async fn list_jobs(&self, process_id: &EntityId) -> Result<Vec<Job>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory ProcessRepository that counts storage round-trips
    #[derive(Default)]
    pub struct InMemoryProcessRepository {
        processes: Mutex<Vec<Process>>,
        jobs: Mutex<Vec<Job>>,
        lookups: AtomicUsize,
        inserts: AtomicUsize,
        // Lookups that report "absent" regardless of contents (simulates a race)
        stale_reads: AtomicUsize,
    }

    impl InMemoryProcessRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of find_* calls served so far
        pub fn lookup_count(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        /// Number of insert_* calls attempted so far
        pub fn insert_count(&self) -> usize {
            self.inserts.load(Ordering::SeqCst)
        }

        /// Make the next `n` lookups miss, as if another session had not committed yet
        pub fn miss_next_lookups(&self, n: usize) {
            self.stale_reads.store(n, Ordering::SeqCst);
        }

        pub fn process_rows(&self) -> Vec<Process> {
            self.processes.lock().unwrap().clone()
        }

        pub fn job_rows(&self) -> Vec<Job> {
            self.jobs.lock().unwrap().clone()
        }

        fn take_stale_read(&self) -> bool {
            self.stale_reads
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl ProcessRepository for InMemoryProcessRepository {
        async fn find_process_by_name(&self, name: &str) -> Result<Option<Process>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.take_stale_read() {
                return Ok(None);
            }
            let processes = self.processes.lock().unwrap();
            Ok(processes.iter().find(|p| p.name == name).cloned())
        }

        async fn insert_process(&self, process: &Process) -> Result<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let mut processes = self.processes.lock().unwrap();
            if processes.iter().any(|p| p.name == process.name) {
                return Err(AppError::Conflict(format!(
                    "process name {} already exists",
                    process.name
                )));
            }
            processes.push(process.clone());
            Ok(())
        }

        async fn find_job(&self, process_id: &EntityId, name: &str) -> Result<Option<Job>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.take_stale_read() {
                return Ok(None);
            }
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .iter()
                .find(|j| &j.process == process_id && j.name == name)
                .cloned())
        }

        async fn insert_job(&self, job: &Job) -> Result<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let mut jobs = self.jobs.lock().unwrap();
            if jobs
                .iter()
                .any(|j| j.process == job.process && j.name == job.name)
            {
                return Err(AppError::Conflict(format!(
                    "job {} already exists for process {}",
                    job.name, job.process
                )));
            }
            jobs.push(job.clone());
            Ok(())
        }

        async fn list_processes(&self) -> Result<Vec<Process>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.processes.lock().unwrap().clone())
        }

        async fn list_jobs(&self, process_id: &EntityId) -> Result<Vec<Job>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .iter()
                .filter(|j| &j.process == process_id)
                .cloned()
                .collect())
        }
    }
}
