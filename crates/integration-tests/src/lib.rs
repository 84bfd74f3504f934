//! Shared fixtures for Recall integration tests

use recall_core::application::{HierarchyManager, JobFacade, MachineScopedAccessor};
use recall_core::port::id_provider::UuidProvider;
use recall_core::port::time_provider::mocks::SteppingTimeProvider;
use recall_core::port::TimeProvider;
use recall_infra_sqlite::{
    create_pool, run_migrations, SqliteEntryRepository, SqliteProcessRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// One in-memory database with services for a single machine
pub struct TestEnv {
    pub pool: SqlitePool,
    pub time: Arc<dyn TimeProvider>,
    pub hierarchy: Arc<HierarchyManager>,
    pub accessor: Arc<MachineScopedAccessor>,
}

impl TestEnv {
    pub async fn new() -> Self {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self::over(pool, "host-a", Arc::new(SteppingTimeProvider::new(1_000, 10)))
    }

    /// Fresh in-memory session (empty index) over an existing database
    pub fn over(pool: SqlitePool, machine: &str, time: Arc<dyn TimeProvider>) -> Self {
        let ids = Arc::new(UuidProvider);

        let hierarchy = Arc::new(HierarchyManager::new(
            Arc::new(SqliteProcessRepository::new(pool.clone())),
            ids.clone(),
            time.clone(),
        ));
        let accessor = Arc::new(MachineScopedAccessor::new(
            Arc::new(SqliteEntryRepository::new(pool.clone())),
            ids,
            time.clone(),
            machine,
        ));

        Self {
            pool,
            time,
            hierarchy,
            accessor,
        }
    }

    /// Same database and clock, separate index, given machine
    pub fn on_machine(&self, machine: &str) -> Self {
        Self::over(self.pool.clone(), machine, self.time.clone())
    }

    pub fn facade(&self, process: &str, job: &str) -> JobFacade {
        JobFacade::new(self.hierarchy.clone(), self.accessor.clone(), process, job)
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(&self.pool).await.unwrap()
    }
}
