//! Definition loader: reads migration directories into `Definition`s

use crate::definition::{Definition, MigrationMetadata};
use crate::error::{CoreError, CoreResult};
use crate::fs::{DirFs, FileSystem};
use crate::sql::SqlQuery;
use std::path::Path;

/// Forward SQL file inside a migration directory
pub const UP_FILE: &str = "up.sql";
/// Reverse SQL file inside a migration directory
pub const DOWN_FILE: &str = "down.sql";
/// Metadata document inside a migration directory
pub const METADATA_FILE: &str = "metadata.yaml";

/// Load every migration under the root of `fs`, sorted by ascending timestamp.
///
/// Each immediate subdirectory must hold `up.sql`, `down.sql` and
/// `metadata.yaml`. Plain files and hidden entries at the root are ignored.
pub fn load_definitions(fs: &dyn FileSystem) -> CoreResult<Vec<Definition>> {
    let root = Path::new("");
    let entries = fs.read_dir(root).map_err(|e| CoreError::IoWithPath {
        path: "migrations root".to_string(),
        source: e,
    })?;

    let mut definitions = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.is_dir || entry.name.starts_with('.') {
            continue;
        }
        let def = load_definition(fs, &entry.name)?;
        log::debug!("Loaded migration {}", def.file_name());
        definitions.push(def);
    }

    definitions.sort_by_key(|d| d.timestamp);
    Ok(definitions)
}

/// Load all definitions from an on-disk directory.
pub fn load_from_dir(dir: &Path) -> CoreResult<Vec<Definition>> {
    if !dir.is_dir() {
        return Err(CoreError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }
    load_definitions(&DirFs::new(dir))
}

fn load_definition(fs: &dyn FileSystem, directory: &str) -> CoreResult<Definition> {
    let read = |file: &str| {
        fs.read_to_string(&Path::new(directory).join(file))
            .map_err(|e| CoreError::MalformedDefinition {
                directory: directory.to_string(),
                reason: format!("failed to read {file}: {e}"),
            })
    };

    let up = read(UP_FILE)?;
    let down = read(DOWN_FILE)?;
    let metadata = read(METADATA_FILE)?;

    let metadata: MigrationMetadata =
        serde_yaml::from_str(&metadata).map_err(|e| CoreError::MalformedDefinition {
            directory: directory.to_string(),
            reason: format!("invalid {METADATA_FILE}: {e}"),
        })?;

    if metadata.name.trim().is_empty() {
        return Err(CoreError::MalformedDefinition {
            directory: directory.to_string(),
            reason: format!("{METADATA_FILE} has an empty name"),
        });
    }

    Ok(Definition::from_parts(
        metadata,
        SqlQuery::from_file_contents(&up),
        SqlQuery::from_file_contents(&down),
    ))
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
