use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let yaml = r#"
database:
  driver: duckdb
  path: ":memory:"
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.migration.directory, "migrations");
    assert_eq!(config.table_name(), "migrations");
    assert_eq!(config.database.driver, Driver::DuckDb);
    assert!(!config.verbose);
    assert_eq!(config.database.pool, PoolConfig::default());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
migration:
  directory: db/migrations
  table_name: schema_log
database:
  driver: postgresql
  host: localhost
  port: 5433
  user: app
  password: secret
  name: appdb
  sslmode: disable
  pool:
    max_open_conns: 4
    max_idle_conns: 1
    conn_max_lifetime_secs: 0
    connect_timeout_secs: 3
verbose: true
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.migrations_dir(), PathBuf::from("db/migrations"));
    assert_eq!(config.table_name(), "schema_log");
    assert_eq!(config.database.driver, Driver::Postgres);
    assert_eq!(config.database.port, Some(5433));
    assert_eq!(config.database.sslmode.as_deref(), Some("disable"));
    assert_eq!(config.database.pool.max_open_conns, 4);
    assert_eq!(config.database.pool.conn_max_lifetime(), None);
    assert_eq!(config.database.pool.connect_timeout(), Duration::from_secs(3));
    assert!(config.verbose);
}

#[test]
fn test_embedded_alias() {
    let config = Config::parse("database:\n  driver: embedded\n  path: app.db\n").unwrap();
    assert_eq!(config.database.driver, Driver::DuckDb);
}

#[test]
fn test_unknown_field_rejected() {
    let err = Config::parse("database:\n  driver: duckdb\n  path: x\n  colour: red\n").unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_postgres_requires_connection_details() {
    let err = Config::parse("database:\n  driver: postgres\n  host: localhost\n").unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));

    let ok = Config::parse("database:\n  url: postgres://u:p@localhost/db\n");
    assert!(ok.is_ok());
}

#[test]
fn test_duckdb_requires_path() {
    let err = Config::parse("database:\n  driver: duckdb\n").unwrap_err();
    assert!(err.to_string().contains("[E003]"));
}

#[test]
fn test_table_name_must_be_identifier() {
    for bad in ["", "1log", "log table", "log;drop", "\"log\""] {
        let mut config = Config::default();
        config.database = DatabaseConfig::duckdb_in_memory();
        config.migration.table_name = bad.to_string();
        assert!(config.validate().is_err(), "{bad:?} should be rejected");
    }
    let mut config = Config::default();
    config.database = DatabaseConfig::duckdb_in_memory();
    config.migration.table_name = "_schema_log2".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_pool_rejected() {
    let yaml = "database:\n  driver: duckdb\n  path: x\n  pool:\n    max_open_conns: 0\n";
    assert!(Config::parse(yaml).is_err());
}

#[test]
#[serial]
fn test_env_expansion() {
    std::env::set_var("MIGRAPH_TEST_DB_PATH", "/tmp/expanded.duckdb");
    std::env::remove_var("MIGRAPH_TEST_UNSET");
    let expanded = expand_env("a=${MIGRAPH_TEST_DB_PATH} b=$MIGRAPH_TEST_DB_PATH c=[$MIGRAPH_TEST_UNSET]");
    assert_eq!(
        expanded,
        "a=/tmp/expanded.duckdb b=/tmp/expanded.duckdb c=[]"
    );

    let config = Config::parse("database:\n  driver: duckdb\n  path: ${MIGRAPH_TEST_DB_PATH}\n").unwrap();
    assert_eq!(config.database.path.as_deref(), Some("/tmp/expanded.duckdb"));
    std::env::remove_var("MIGRAPH_TEST_DB_PATH");
}

#[test]
fn test_load_from_dir() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("migraph.yml"),
        "migration:\n  directory: m\ndatabase:\n  driver: duckdb\n  path: ':memory:'\n",
    )
    .unwrap();
    let config = Config::load_from_dir(tmp.path()).unwrap();
    assert_eq!(config.migration.directory, "m");
}

#[test]
fn test_config_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = Config::load_from_dir(tmp.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}
