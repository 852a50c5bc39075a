use super::*;
use crate::config::DatabaseConfig;
use tempfile::TempDir;

fn write_migration(root: &std::path::Path, ts: i64, name: &str, parents: &str) {
    let dir = root.join(format!("{ts}_{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("up.sql"), "SELECT 1;").unwrap();
    std::fs::write(dir.join("down.sql"), "SELECT 1;").unwrap();
    std::fs::write(
        dir.join("metadata.yaml"),
        format!("name: {name}\ntimestamp: {ts}\nparents: {parents}\n"),
    )
    .unwrap();
}

fn config_for(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.migration.directory = dir.display().to_string();
    config.database = DatabaseConfig::duckdb_in_memory();
    config
}

#[test]
fn test_format_parsing() {
    assert_eq!("dot".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
    assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    let err = "svg".parse::<ExportFormat>().unwrap_err();
    assert!(err.to_string().contains("Unsupported export format: svg"));
}

#[test]
fn test_export_dot() {
    let tmp = TempDir::new().unwrap();
    write_migration(tmp.path(), 1651234567, "create_users", "[]");
    write_migration(tmp.path(), 1651234568, "create_posts", "[1651234567]");

    let mut out = Vec::new();
    export_graph(&mut out, &config_for(tmp.path()), ExportFormat::Dot).unwrap();
    let dot = String::from_utf8(out).unwrap();

    assert_eq!(
        dot,
        "digraph Migrations {\n  node [shape=box];\n  \
         \"1651234567\" [label=\"create_users\\n(1651234567)\"];\n  \
         \"1651234568\" [label=\"create_posts\\n(1651234568)\"];\n  \
         \"1651234567\" -> \"1651234568\";\n}\n"
    );
}

#[test]
fn test_export_json() {
    let tmp = TempDir::new().unwrap();
    write_migration(tmp.path(), 100, "a", "[]");
    write_migration(tmp.path(), 200, "b", "[100]");
    write_migration(tmp.path(), 300, "c", "[100]");

    let mut out = Vec::new();
    export_graph(&mut out, &config_for(tmp.path()), ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["100"]["name"], "a");
    assert_eq!(value["100"]["children"], serde_json::json!([200, 300]));
    assert_eq!(value["100"]["parents"], serde_json::json!([]));
    assert_eq!(value["300"]["parents"], serde_json::json!([100]));
    assert_eq!(value["200"]["timestamp"], 200);
}

#[test]
fn test_export_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let mut out = Vec::new();
    let err = export_graph(&mut out, &config_for(tmp.path()), ExportFormat::Json).unwrap_err();
    assert!(matches!(err, CoreError::NoMigrations));
    assert!(out.is_empty());
}
