// Cache presence hooks invoked by JobFacade::load

use super::JobFacade;
use crate::error::Result;
use async_trait::async_trait;

/// Extension points fired once after `load()`, picked by the cache-presence probe
///
/// Both methods default to no-ops.
#[async_trait]
pub trait CacheHooks: Send + Sync {
    /// Cache entries already exist for (process, job, machine)
    async fn on_cache_exist(&self, _job: &mut JobFacade) -> Result<()> {
        Ok(())
    }

    /// No cache entry exists yet for (process, job, machine)
    async fn on_cache_empty(&self, _job: &mut JobFacade) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing
pub struct NoopHooks;

impl CacheHooks for NoopHooks {}

/// Rebuilds the materialized cache views when previous entries exist
pub struct SyncOnExist;

#[async_trait]
impl CacheHooks for SyncOnExist {
    async fn on_cache_exist(&self, job: &mut JobFacade) -> Result<()> {
        job.sync_cache().await
    }
}
