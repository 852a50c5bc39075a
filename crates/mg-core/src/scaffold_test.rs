use super::*;
use crate::config::DatabaseConfig;
use crate::loader::load_from_dir;
use crate::sql::SqlQuery;
use tempfile::TempDir;

fn config_for(dir: &Path) -> Config {
    let mut config = Config::default();
    config.migration.directory = dir.display().to_string();
    config.database = DatabaseConfig::duckdb_in_memory();
    config
}

#[test]
fn test_sanitize_name() {
    assert_eq!(sanitize_name("Create Users"), "create_users");
    assert_eq!(sanitize_name("add-index!on orders"), "addindexon_orders");
    assert_eq!(sanitize_name("v2 Cleanup"), "v2_cleanup");
}

#[test]
fn test_add_first_migration_has_no_parents() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("migrations");
    let created = add_migration_at(&config_for(&root), "Create Users", 1000).unwrap();

    assert_eq!(created.directory, root.join("1000_create_users"));
    assert!(created.up_path().exists());
    assert!(created.down_path().exists());
    assert!(created.metadata.parents.is_empty());

    let defs = load_from_dir(&root).unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].file_name(), "1000_create_users");
}

#[test]
fn test_add_uses_current_leaves_as_parents() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(tmp.path());
    add_migration_at(&config, "base", 100).unwrap();
    add_migration_at(&config, "branch a", 200).unwrap();

    // A second branch off 100, authored concurrently
    let dir = tmp.path().join("300_branch_b");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("up.sql"), "").unwrap();
    std::fs::write(dir.join("down.sql"), "").unwrap();
    std::fs::write(dir.join("metadata.yaml"), "name: branch_b\ntimestamp: 300\nparents: [100]\n").unwrap();

    let merged = add_migration_at(&config, "merge", 400).unwrap();
    assert_eq!(merged.metadata.parents, vec![200, 300]);

    let written = std::fs::read_to_string(merged.metadata_path()).unwrap();
    let parsed: MigrationMetadata = serde_yaml::from_str(&written).unwrap();
    assert_eq!(parsed, merged.metadata);
}

#[test]
fn test_add_rejects_empty_slug() {
    let tmp = TempDir::new().unwrap();
    let err = add_migration_at(&config_for(tmp.path()), "!!!", 100).unwrap_err();
    assert!(matches!(err, CoreError::InvalidMigrationName { .. }));
}

#[test]
fn test_add_rejects_taken_timestamp() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(tmp.path());
    add_migration_at(&config, "first", 100).unwrap();
    let err = add_migration_at(&config, "second", 100).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateMigration { timestamp: 100, .. }));
    assert!(!tmp.path().join("100_second").exists());
}

#[test]
fn test_templates_hold_no_statements() {
    assert!(!SqlQuery::from_file_contents(UP_TEMPLATE).has_statements());
    assert!(!SqlQuery::from_file_contents(DOWN_TEMPLATE).has_statements());
}
