//! End-to-end runs from a migrations directory on disk

use mg_core::Config;
use mg_db::{Database, DuckDbBackend, LogTable};
use mg_runner::{down, up, RunnerError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write_migration(root: &Path, timestamp: i64, name: &str, parents: &[i64], up: &str, down: &str) {
    let dir = root.join(format!("{timestamp}_{name}"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("up.sql"), up).unwrap();
    fs::write(dir.join("down.sql"), down).unwrap();
    let parents: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
    fs::write(
        dir.join("metadata.yaml"),
        format!(
            "name: {name}\ntimestamp: {timestamp}\nparents: [{}]\n",
            parents.join(", ")
        ),
    )
    .unwrap();
}

fn project() -> (TempDir, Config) {
    let temp = TempDir::new().unwrap();
    let migrations = temp.path().join("migrations");
    write_migration(
        &migrations,
        1_700_000_000,
        "create_users",
        &[],
        "BEGIN;\nCREATE TABLE users (id INT PRIMARY KEY, email VARCHAR);\nCOMMIT;\n",
        "DROP TABLE users;\n",
    );
    write_migration(
        &migrations,
        1_700_000_100,
        "create_orders",
        &[1_700_000_000],
        "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT);\n",
        "DROP TABLE orders;\n",
    );
    write_migration(
        &migrations,
        1_700_000_200,
        "seed_users",
        &[1_700_000_000],
        "INSERT INTO users VALUES (1, 'a@example.com'), (2, 'b@example.com');\n",
        "DELETE FROM users;\n",
    );

    let mut config = Config::default();
    config.migration.directory = migrations.to_string_lossy().into_owned();
    config.migration.table_name = "schema_migrations".to_string();
    (temp, config)
}

async fn applied(db: &DuckDbBackend) -> Vec<String> {
    LogTable::new("schema_migrations")
        .applied(db)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect()
}

#[tokio::test]
async fn test_up_and_down_from_disk() {
    let (_temp, config) = project();
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = up(&db, &config, 0, false, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        summary.names(),
        vec![
            "1700000000_create_users",
            "1700000100_create_orders",
            "1700000200_seed_users"
        ]
    );
    let users = db.query_row("SELECT COUNT(*) FROM users", &[]).await.unwrap();
    assert_eq!(users.unwrap()[0].as_i64(), Some(2));

    let summary = down(&db, &config, 1, false, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.names(), vec!["1700000200_seed_users"]);
    let users = db.query_row("SELECT COUNT(*) FROM users", &[]).await.unwrap();
    assert_eq!(users.unwrap()[0].as_i64(), Some(0));
    assert_eq!(applied(&db).await.len(), 2);
}

#[tokio::test]
async fn test_count_is_validated_before_loading() {
    let mut config = Config::default();
    config.migration.directory = "/nonexistent/migraph/migrations".to_string();
    let db = DuckDbBackend::in_memory().unwrap();

    let err = up(&db, &config, -1, false, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::InvalidCount { .. }));

    let err = down(&db, &config, 0, true, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::InvalidCount { .. }));

    let err = up(&db, &config, 0, false, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::Core(_)));
}

#[tokio::test]
async fn test_dry_run_down_reports_without_rolling_back() {
    let (_temp, config) = project();
    let db = DuckDbBackend::in_memory().unwrap();
    up(&db, &config, 0, false, CancellationToken::new())
        .await
        .unwrap();

    let summary = down(&db, &config, 2, true, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        summary.names(),
        vec!["1700000200_seed_users", "1700000100_create_orders"]
    );
    assert_eq!(applied(&db).await.len(), 3);
}
