//! Authoring new migrations on disk

use crate::config::Config;
use crate::definition::MigrationMetadata;
use crate::error::{CoreError, CoreResult};
use crate::graph::MigrationGraph;
use crate::loader::{load_from_dir, DOWN_FILE, METADATA_FILE, UP_FILE};
use std::path::{Path, PathBuf};

const UP_TEMPLATE: &str = "-- Write the forward migration here.
--
-- Runs inside a transaction unless metadata.yaml sets `no_transaction: true`;
-- do not add BEGIN/COMMIT yourself.
";

const DOWN_TEMPLATE: &str = "-- Undo everything the up migration does.
";

/// A freshly created migration directory.
#[derive(Debug, Clone)]
pub struct CreatedMigration {
    pub directory: PathBuf,
    pub metadata: MigrationMetadata,
}

impl CreatedMigration {
    pub fn up_path(&self) -> PathBuf {
        self.directory.join(UP_FILE)
    }

    pub fn down_path(&self) -> PathBuf {
        self.directory.join(DOWN_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.directory.join(METADATA_FILE)
    }
}

/// Lowercase, turn spaces into underscores and drop anything outside `[a-z0-9_]`.
pub fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Create `{timestamp}_{slug}/` with stub SQL files, depending on the current leaves.
pub fn add_migration(config: &Config, name: &str) -> CoreResult<CreatedMigration> {
    let timestamp = chrono::Utc::now().timestamp();
    add_migration_at(config, name, timestamp)
}

/// [`add_migration`] with an explicit timestamp.
pub fn add_migration_at(config: &Config, name: &str, timestamp: i64) -> CoreResult<CreatedMigration> {
    let slug = sanitize_name(name);
    if slug.trim_matches('_').is_empty() {
        return Err(CoreError::InvalidMigrationName {
            name: name.to_string(),
        });
    }

    let root = config.migrations_dir();
    let parents = if root.is_dir() {
        let graph = MigrationGraph::build(load_from_dir(&root)?)?;
        if graph.get_definition(timestamp).is_some() {
            return Err(CoreError::DuplicateMigration {
                timestamp,
                name: slug,
            });
        }
        graph.leaves()
    } else {
        Vec::new()
    };

    let metadata = MigrationMetadata {
        name: slug,
        timestamp,
        description: String::new(),
        parents,
        no_transaction: false,
    };
    let directory = root.join(format!("{timestamp}_{}", metadata.name));
    if directory.exists() {
        return Err(CoreError::DuplicateMigration {
            timestamp,
            name: metadata.name,
        });
    }

    if let Err(e) = write_files(&directory, &metadata) {
        if let Err(cleanup) = std::fs::remove_dir_all(&directory) {
            log::warn!(
                "Failed to remove partially created {}: {cleanup}",
                directory.display()
            );
        }
        return Err(e);
    }

    log::debug!("Created migration {}", directory.display());
    Ok(CreatedMigration {
        directory,
        metadata,
    })
}

fn write_files(directory: &Path, metadata: &MigrationMetadata) -> CoreResult<()> {
    std::fs::create_dir_all(directory).map_err(|e| CoreError::IoWithPath {
        path: directory.display().to_string(),
        source: e,
    })?;

    let metadata_yaml = serde_yaml::to_string(metadata)?;
    for (file, contents) in [
        (UP_FILE, UP_TEMPLATE),
        (DOWN_FILE, DOWN_TEMPLATE),
        (METADATA_FILE, metadata_yaml.as_str()),
    ] {
        let path = directory.join(file);
        std::fs::write(&path, contents).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
