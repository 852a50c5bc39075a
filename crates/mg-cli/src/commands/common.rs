//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use mg_core::{Config, CoreError};
use mg_db::Database;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Load the configuration named by `--config`, or `migraph.yml` from the
/// current directory. `--verbose` forces a verbose run summary.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = load_config_from(global.config.as_deref(), Path::new("."))?;
    config.verbose |= global.verbose;
    Ok(config)
}

/// An explicit path must exist. Without one, a missing default file yields
/// the built-in defaults so `add` and `export` work in a bare directory.
pub(crate) fn load_config_from(explicit: Option<&str>, dir: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(Path::new(path)).with_context(|| format!("Failed to load config {path}"));
    }
    match Config::load_from_dir(dir) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { path }) => {
            log::debug!("No config at {path}; using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

/// Validate the database section and open the configured backend.
pub(crate) fn connect(config: &Config) -> Result<Arc<dyn Database>> {
    config.validate().context("Invalid configuration")?;
    mg_db::connect(&config.database).context("Failed to connect to database")
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
