//! Dependency wiring (composition root)

use anyhow::{Context, Result};
use recall_core::application::{HierarchyManager, JobFacade, MachineScopedAccessor};
use recall_core::port::id_provider::UuidProvider;
use recall_core::port::time_provider::SystemTimeProvider;
use recall_infra_sqlite::{
    create_pool, current_schema_version, run_migrations, SqliteEntryRepository,
    SqliteProcessRepository, LATEST_SCHEMA_VERSION,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Expand `~` and make sure the parent directory of a file database exists
pub fn prepare_database_url(raw: &str) -> Result<String> {
    let expanded = shellexpand::tilde(raw).into_owned();

    let is_memory = expanded.contains(":memory:");
    let path = expanded.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    if !is_memory {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    Ok(expanded)
}

/// Provision or upgrade the schema; returns (before, after) versions
pub async fn sync_schema(database_url: &str) -> Result<(i64, i64)> {
    let pool = create_pool(database_url)
        .await
        .context("DB pool creation failed")?;

    let before = current_schema_version(&pool).await?;
    run_migrations(&pool).await.context("Migration failed")?;
    let after = current_schema_version(&pool).await?;

    info!(before, after, "Schema synchronized");
    Ok((before, after))
}

/// Wired services for one CLI invocation
pub struct App {
    pub hierarchy: Arc<HierarchyManager>,
    pub accessor: Arc<MachineScopedAccessor>,
}

impl App {
    pub async fn connect(database_url: &str, machine: String) -> Result<Self> {
        let pool = create_pool(database_url)
            .await
            .context("DB pool creation failed")?;

        let version = current_schema_version(&pool).await?;
        if version < LATEST_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema is at version {} (need {}); run `recall sync` first",
                version,
                LATEST_SCHEMA_VERSION
            );
        }

        debug!(machine = %machine, "Wiring services");

        let time_provider = Arc::new(SystemTimeProvider);
        let id_provider = Arc::new(UuidProvider);

        let hierarchy = Arc::new(HierarchyManager::new(
            Arc::new(SqliteProcessRepository::new(pool.clone())),
            id_provider.clone(),
            time_provider.clone(),
        ));
        let accessor = Arc::new(MachineScopedAccessor::new(
            Arc::new(SqliteEntryRepository::new(pool)),
            id_provider,
            time_provider,
            machine,
        ));

        Ok(Self {
            hierarchy,
            accessor,
        })
    }

    /// Loaded façade for (process, job); creates both when absent
    pub async fn job(&self, process: &str, job: &str) -> Result<JobFacade> {
        let mut facade = JobFacade::new(
            self.hierarchy.clone(),
            self.accessor.clone(),
            process,
            job,
        )
        .without_cache_probe();
        facade.load().await?;
        Ok(facade)
    }
}
