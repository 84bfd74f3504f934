// Job Façade - lifecycle wrapper over HierarchyManager + MachineScopedAccessor
//
// State machine: unloaded -> loaded. Every delegated call requires `load()`.

pub mod hooks;

pub use hooks::{CacheHooks, NoopHooks, SyncOnExist};

use crate::application::{HierarchyManager, MachineScopedAccessor};
use crate::domain::{CacheEntry, EntityId, Job, LogEntry, LogFilter, LogType, Process};
use crate::error::{AppError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key -> (entry id -> entry)
pub type CacheTree = BTreeMap<String, BTreeMap<EntityId, CacheEntry>>;

#[derive(Debug, Clone)]
struct Resolved {
    process: Process,
    job: Job,
}

/// One named job of one named process, on the accessor's machine
pub struct JobFacade {
    hierarchy: Arc<HierarchyManager>,
    accessor: Arc<MachineScopedAccessor>,
    process_name: String,
    job_name: String,
    hooks: Arc<dyn CacheHooks>,
    probe_cache: bool,
    resolved: Option<Resolved>,
    cache_by_id: BTreeMap<EntityId, CacheEntry>,
    cache_tree: CacheTree,
    cache_order: HashMap<String, Vec<EntityId>>,
}

impl JobFacade {
    /// Create an unloaded façade
    ///
    /// # Example
    /// ```ignore
    /// let mut job = JobFacade::new(hierarchy, accessor, "billing", "Nightly Export")
    ///     .with_hooks(Arc::new(SyncOnExist));
    /// job.load().await?;
    /// job.create_cache("cursor", "2024-01-01").await?;
    /// ```
    pub fn new(
        hierarchy: Arc<HierarchyManager>,
        accessor: Arc<MachineScopedAccessor>,
        process_name: impl Into<String>,
        job_name: impl Into<String>,
    ) -> Self {
        Self {
            hierarchy,
            accessor,
            process_name: process_name.into(),
            job_name: job_name.into(),
            hooks: Arc::new(NoopHooks),
            probe_cache: true,
            resolved: None,
            cache_by_id: BTreeMap::new(),
            cache_tree: BTreeMap::new(),
            cache_order: HashMap::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn CacheHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Skip the cache-presence probe (and therefore the hooks) during `load()`
    pub fn without_cache_probe(mut self) -> Self {
        self.probe_cache = false;
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.resolved.is_some()
    }

    /// Resolve (get-or-create) process and job, then fire exactly one hook
    ///
    /// Calling again after a successful load is a no-op. If the probe or the
    /// hook fails the façade stays unloaded, so a retry fires the hook again.
    pub async fn load(&mut self) -> Result<()> {
        if self.resolved.is_some() {
            return Ok(());
        }

        let (process, job) = self
            .hierarchy
            .resolve(&self.process_name, &self.job_name)
            .await?;
        info!(
            process = %process.name,
            job = %job.name,
            machine = %self.accessor.machine(),
            "Job loaded"
        );
        self.resolved = Some(Resolved { process, job });

        if self.probe_cache {
            if let Err(e) = self.fire_hook().await {
                warn!(error = %e, "Cache hook failed; job left unloaded");
                self.resolved = None;
                self.clear_views();
                return Err(e);
            }
        }

        Ok(())
    }

    async fn fire_hook(&mut self) -> Result<()> {
        let hooks = Arc::clone(&self.hooks);
        if self.has_cache().await? {
            hooks.on_cache_exist(self).await
        } else {
            hooks.on_cache_empty(self).await
        }
    }

    fn clear_views(&mut self) {
        self.cache_by_id.clear();
        self.cache_tree.clear();
        self.cache_order.clear();
    }

    fn resolved(&self) -> Result<&Resolved> {
        self.resolved.as_ref().ok_or_else(|| {
            AppError::NotLoaded(format!(
                "job '{}' of process '{}' used before load()",
                self.job_name, self.process_name
            ))
        })
    }

    pub fn process(&self) -> Result<&Process> {
        Ok(&self.resolved()?.process)
    }

    pub fn job(&self) -> Result<&Job> {
        Ok(&self.resolved()?.job)
    }

    pub fn machine(&self) -> &str {
        self.accessor.machine()
    }

    pub async fn create_log(&self, message: &str, log_type: LogType) -> Result<LogEntry> {
        let r = self.resolved()?;
        self.accessor
            .create_log(&r.process, &r.job, message, log_type)
            .await
    }

    pub async fn log(&self, message: &str) -> Result<LogEntry> {
        self.create_log(message, LogType::Generic).await
    }

    pub async fn warn(&self, message: &str) -> Result<LogEntry> {
        self.create_log(message, LogType::Warning).await
    }

    pub async fn error(&self, message: &str) -> Result<LogEntry> {
        self.create_log(message, LogType::Error).await
    }

    pub async fn create_cache(&self, key: &str, value: &str) -> Result<CacheEntry> {
        let r = self.resolved()?;
        self.accessor.create_cache(&r.process, &r.job, key, value).await
    }

    /// Append `value` serialized as JSON
    pub async fn put_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<CacheEntry> {
        let text = serde_json::to_string(value)?;
        self.create_cache(key, &text).await
    }

    pub async fn get_cache(&self, key: &str) -> Result<Vec<CacheEntry>> {
        let r = self.resolved()?;
        self.accessor.get_cache(&r.process, &r.job, key).await
    }

    /// Most recent value for `key` decoded from JSON, if any
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_cache(key).await?.last() {
            Some(entry) => Ok(Some(entry.json()?)),
            None => Ok(None),
        }
    }

    pub async fn has_cache(&self) -> Result<bool> {
        let r = self.resolved()?;
        self.accessor.has_cache(&r.process, &r.job).await
    }

    pub async fn has_cache_key(&self, key: &str) -> Result<bool> {
        let r = self.resolved()?;
        self.accessor.has_cache_key(&r.process, &r.job, key).await
    }

    pub async fn process_logs(&self, filter: LogFilter) -> Result<Vec<LogEntry>> {
        let r = self.resolved()?;
        self.accessor.get_process_logs(&r.process, filter).await
    }

    pub async fn job_logs(&self, filter: LogFilter) -> Result<Vec<LogEntry>> {
        let r = self.resolved()?;
        self.accessor.get_job_logs(&r.process, &r.job, filter).await
    }

    /// Rebuild both materialized views from a full fetch of cache entries
    ///
    /// Views are cleared and repopulated, never merged.
    pub async fn sync_cache(&mut self) -> Result<()> {
        let entries = {
            let r = self.resolved()?;
            self.accessor.get_all_cache(&r.process, &r.job).await?
        };

        self.clear_views();

        for entry in entries {
            self.cache_order
                .entry(entry.key.clone())
                .or_default()
                .push(entry.id.clone());
            self.cache_tree
                .entry(entry.key.clone())
                .or_default()
                .insert(entry.id.clone(), entry.clone());
            self.cache_by_id.insert(entry.id.clone(), entry);
        }

        debug!(
            entries = self.cache_by_id.len(),
            keys = self.cache_tree.len(),
            "Cache views rebuilt"
        );
        Ok(())
    }

    /// Flat view: entry id -> entry (as of the last `sync_cache`)
    pub fn cache_by_id(&self) -> &BTreeMap<EntityId, CacheEntry> {
        &self.cache_by_id
    }

    /// Tree view: key -> entry id -> entry (as of the last `sync_cache`)
    pub fn cache_tree(&self) -> &CacheTree {
        &self.cache_tree
    }

    /// Synced entries for `key` in append order
    pub fn cached(&self, key: &str) -> Vec<&CacheEntry> {
        self.cache_order
            .get(key)
            .map(|ids| ids.iter().filter_map(|id| self.cache_by_id.get(id)).collect())
            .unwrap_or_default()
    }
}
