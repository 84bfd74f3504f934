//! State survives reopening a file-backed database

use recall_core::domain::{LogFilter, LogType};
use recall_core::port::time_provider::SystemTimeProvider;
use recall_infra_sqlite::{create_pool, run_migrations};
use recall_integration_tests::TestEnv;
use std::sync::Arc;

#[tokio::test]
async fn test_state_persists_after_reopen() {
    let db_path = std::env::temp_dir().join(format!("recall_persist_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&db_path);
    let url = db_path.to_str().unwrap().to_string();

    let job_id = {
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let env = TestEnv::over(pool.clone(), "host-a", Arc::new(SystemTimeProvider));

        let mut job = env.facade("backup", "nightly");
        job.load().await.unwrap();
        job.create_cache("snapshot", "s-1").await.unwrap();
        job.error("disk full").await.unwrap();
        let id = job.job().unwrap().id.clone();
        pool.close().await;
        id
    };

    let pool = create_pool(&url).await.unwrap();
    // Re-running migrations on an up-to-date schema is harmless
    run_migrations(&pool).await.unwrap();
    let env = TestEnv::over(pool.clone(), "host-a", Arc::new(SystemTimeProvider));

    let mut job = env.facade("Backup", "Nightly");
    job.load().await.unwrap();
    assert_eq!(job.job().unwrap().id, job_id);
    assert!(job.has_cache_key("snapshot").await.unwrap());

    let errors = job.job_logs(LogFilter::of_type(LogType::Error)).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "disk full");

    pool.close().await;
    let _ = std::fs::remove_file(&db_path);
}
