// Entry Repository Port (Interface)
// Log and cache entries are append-only: insert + read, no update/delete.

use crate::domain::{CacheEntry, CacheScope, LogEntry, LogQuery};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Log / Cache entry persistence
///
/// Multi-row reads are ordered by `created_at` ascending, insertion order breaking ties.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Append a log entry
    async fn insert_log(&self, entry: &LogEntry) -> Result<()>;

    /// List logs of a process (optionally one job), filtered and paginated
    async fn find_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>>;

    /// Append a cache entry (never an upsert)
    async fn insert_cache(&self, entry: &CacheEntry) -> Result<()>;

    /// Cache entries in scope, restricted to `key` when given
    async fn find_cache(&self, scope: &CacheScope, key: Option<&str>) -> Result<Vec<CacheEntry>>;

    /// Count cache entries in scope, restricted to `key` when given
    async fn count_cache(&self, scope: &CacheScope, key: Option<&str>) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory EntryRepository (Vec order stands in for rowid)
    #[derive(Default)]
    pub struct InMemoryEntryRepository {
        logs: Mutex<Vec<LogEntry>>,
        cache: Mutex<Vec<CacheEntry>>,
    }

    impl InMemoryEntryRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn log_rows(&self) -> Vec<LogEntry> {
            self.logs.lock().unwrap().clone()
        }

        pub fn cache_rows(&self) -> Vec<CacheEntry> {
            self.cache.lock().unwrap().clone()
        }

        fn in_scope(entry: &CacheEntry, scope: &CacheScope, key: Option<&str>) -> bool {
            entry.process == scope.process
                && entry.job == scope.job
                && entry.machine == scope.machine
                && key.map_or(true, |k| entry.key == k)
        }
    }

    #[async_trait]
    impl EntryRepository for InMemoryEntryRepository {
        async fn insert_log(&self, entry: &LogEntry) -> Result<()> {
            self.logs.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn find_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
            let mut matching: Vec<LogEntry> = self
                .logs
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.process == query.process)
                .filter(|l| query.job.as_ref().map_or(true, |j| &l.job == j))
                .filter(|l| query.filter.log_type.map_or(true, |t| l.log_type == t))
                .cloned()
                .collect();

            // Stable sort keeps insertion order for equal timestamps
            matching.sort_by_key(|l| l.created_at);

            let offset = query.filter.offset.unwrap_or(0) as usize;
            let limit = query.filter.limit.map_or(usize::MAX, |l| l as usize);
            Ok(matching.into_iter().skip(offset).take(limit).collect())
        }

        async fn insert_cache(&self, entry: &CacheEntry) -> Result<()> {
            self.cache.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn find_cache(
            &self,
            scope: &CacheScope,
            key: Option<&str>,
        ) -> Result<Vec<CacheEntry>> {
            let mut matching: Vec<CacheEntry> = self
                .cache
                .lock()
                .unwrap()
                .iter()
                .filter(|c| Self::in_scope(c, scope, key))
                .cloned()
                .collect();
            matching.sort_by_key(|c| c.created_at);
            Ok(matching)
        }

        async fn count_cache(&self, scope: &CacheScope, key: Option<&str>) -> Result<i64> {
            let cache = self.cache.lock().unwrap();
            Ok(cache
                .iter()
                .filter(|c| Self::in_scope(c, scope, key))
                .count() as i64)
        }
    }
}
