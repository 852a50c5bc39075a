use super::*;
use tempfile::TempDir;

#[test]
fn test_missing_default_config_falls_back() {
    let temp = TempDir::new().unwrap();
    let config = load_config_from(None, temp.path()).unwrap();
    assert_eq!(config.table_name(), "migrations");
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.yml");
    let err = load_config_from(Some(path.to_str().unwrap()), temp.path()).unwrap_err();
    assert!(format!("{err:#}").contains("[E001]"));
}

#[test]
fn test_default_config_file_is_found() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("migraph.yml"),
        "migration:\n  table_name: schema_log\ndatabase:\n  driver: duckdb\n  path: \":memory:\"\n",
    )
    .unwrap();

    let config = load_config_from(None, temp.path()).unwrap();
    assert_eq!(config.table_name(), "schema_log");
    assert!(connect(&config).is_ok());
}

#[test]
fn test_connect_rejects_incomplete_postgres_config() {
    let err = connect(&Config::default()).err().unwrap();
    assert!(format!("{err:#}").contains("Invalid configuration"));
}
