use super::*;
use crate::duckdb::DuckDbBackend;
use chrono::TimeZone;

#[tokio::test]
async fn test_ensure_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = LogTable::new("migrations");

    assert!(!table.exists(&db).await.unwrap());
    table.ensure(&db).await.unwrap();
    table.ensure(&db).await.unwrap();
    assert!(table.exists(&db).await.unwrap());
    assert!(table.applied(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ensure_creates_name_index() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = LogTable::new("migrations");
    table.ensure(&db).await.unwrap();
    table.ensure(&db).await.unwrap();

    let indexes: Vec<String> = db
        .query(
            "SELECT index_name FROM duckdb_indexes() WHERE table_name = 'migrations'",
            &[],
        )
        .await
        .unwrap()
        .into_iter()
        .filter_map(|row| row.first().and_then(|v| v.as_str()).map(str::to_string))
        .collect();
    assert!(indexes.iter().any(|i| i == "migrations_name_idx"), "{indexes:?}");
}

#[tokio::test]
async fn test_insert_and_delete_round_trip() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = LogTable::new("schema_log");
    table.ensure(&db).await.unwrap();

    let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let mut tx = db.begin().await.unwrap();
    table
        .insert(tx.as_mut(), db.dialect(), "100_a", started, Duration::from_micros(1_500))
        .await
        .unwrap();
    table
        .insert(tx.as_mut(), db.dialect(), "200_b", started, Duration::from_millis(20))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    drop(tx);

    let applied = table.applied(&db).await.unwrap();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].name, "100_a");
    assert_eq!(applied[0].migration_time, started);
    assert_eq!(applied[0].duration, Duration::from_micros(1_500));
    assert!(applied[0].id < applied[1].id);

    let mut tx = db.begin().await.unwrap();
    table.delete(tx.as_mut(), db.dialect(), "100_a").await.unwrap();
    tx.commit().await.unwrap();
    drop(tx);

    let names: Vec<_> = table
        .applied(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["200_b"]);
}
