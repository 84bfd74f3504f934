//! Process / job get-or-create against SQLite

use recall_integration_tests::TestEnv;

#[tokio::test]
async fn test_create_process_twice_single_row() {
    let env = TestEnv::new().await;

    let first = env.hierarchy.create_process("Foo").await.unwrap();
    let second = env.hierarchy.create_process("Foo").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(
        env.count("SELECT COUNT(*) FROM processes WHERE name = 'foo'").await,
        1
    );
    assert_eq!(env.count("SELECT COUNT(*) FROM processes").await, 1);
}

#[tokio::test]
async fn test_independent_sessions_share_one_row() {
    let env = TestEnv::new().await;
    let other = env.on_machine("host-b");

    let a = env.hierarchy.create_process("Report Builder").await.unwrap();
    let b = other.hierarchy.create_process("report builder").await.unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(env.count("SELECT COUNT(*) FROM processes").await, 1);
}

#[tokio::test]
async fn test_create_job_twice_same_id_distinct_per_process() {
    let env = TestEnv::new().await;
    let p = env.hierarchy.create_process("alpha").await.unwrap();
    let q = env.hierarchy.create_process("beta").await.unwrap();

    let first = env.hierarchy.create_job(&p, "Build").await.unwrap();
    let second = env.hierarchy.create_job(&p, "Build").await.unwrap();
    let other = env.hierarchy.create_job(&q, "Build").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_ne!(first.id, other.id);
    assert_eq!(first.name, "build");
    assert_eq!(env.count("SELECT COUNT(*) FROM process_jobs").await, 2);
}

#[tokio::test]
async fn test_get_does_not_create() {
    let env = TestEnv::new().await;

    assert!(env.hierarchy.get_process("missing").await.unwrap().is_none());
    let p = env.hierarchy.create_process("present").await.unwrap();
    assert!(env.hierarchy.get_job(&p, "missing").await.unwrap().is_none());

    assert_eq!(env.count("SELECT COUNT(*) FROM processes").await, 1);
    assert_eq!(env.count("SELECT COUNT(*) FROM process_jobs").await, 0);
}

#[tokio::test]
async fn test_lookup_path_normalizes() {
    let env = TestEnv::new().await;
    let created = env.hierarchy.create_process("Nightly, Sync.").await.unwrap();

    let fresh = env.on_machine("host-b");
    let found = fresh.hierarchy.get_process("NIGHTLY sync").await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(created.id));
}

#[tokio::test]
async fn test_list_processes_and_jobs() {
    let env = TestEnv::new().await;
    let (p, _) = env.hierarchy.resolve("etl", "extract").await.unwrap();
    env.hierarchy.create_job(&p, "load").await.unwrap();
    env.hierarchy.create_process("other").await.unwrap();

    let names: Vec<String> = env
        .hierarchy
        .list_processes()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["etl", "other"]);

    let jobs: Vec<String> = env
        .hierarchy
        .list_jobs(&p)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.name)
        .collect();
    assert_eq!(jobs, vec!["extract", "load"]);
}
