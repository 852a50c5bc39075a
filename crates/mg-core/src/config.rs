//! Configuration types and parsing for migraph.yml

use crate::error::{CoreError, CoreResult};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Default configuration file name
pub const CONFIG_FILE: &str = "migraph.yml";

/// Main configuration from migraph.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where migrations live and how they are recorded
    #[serde(default)]
    pub migration: MigrationConfig,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Report every touched migration in the run summary
    #[serde(default)]
    pub verbose: bool,
}

/// Migration directory and bookkeeping table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Directory holding one subdirectory per migration
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Name of the bookkeeping table
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            table_name: default_table_name(),
        }
    }
}

fn default_directory() -> String {
    "migrations".to_string()
}

fn default_table_name() -> String {
    "migrations".to_string()
}

/// Database engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// PostgreSQL and wire-compatible servers
    #[default]
    #[serde(alias = "postgresql")]
    Postgres,
    /// Embedded file database
    #[serde(alias = "embedded")]
    DuckDb,
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Driver::Postgres => write!(f, "postgres"),
            Driver::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub driver: Driver,

    /// Full connection string; wins over the discrete fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Database name on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// disable | allow | prefer | require | verify-ca | verify-full
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sslmode: Option<String>,

    /// DuckDB database file, or `:memory:`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub pool: PoolConfig,
}

impl DatabaseConfig {
    /// In-memory DuckDB configuration, mostly useful in tests.
    pub fn duckdb_in_memory() -> Self {
        Self {
            driver: Driver::DuckDb,
            path: Some(":memory:".to_string()),
            ..Self::default()
        }
    }

    fn has(field: &Option<String>) -> bool {
        field.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    fn validate(&self) -> CoreResult<()> {
        match self.driver {
            Driver::Postgres => {
                let discrete = Self::has(&self.host) && Self::has(&self.user) && Self::has(&self.name);
                if !Self::has(&self.url) && !discrete {
                    return Err(CoreError::ConfigInvalid {
                        message: "database: postgres requires either 'url' or 'host', 'user' and 'name'"
                            .to_string(),
                    });
                }
            }
            Driver::DuckDb => {
                if !Self::has(&self.path) {
                    return Err(CoreError::ConfigInvalid {
                        message: "database: duckdb requires 'path' (a file or :memory:)".to_string(),
                    });
                }
            }
        }
        self.pool.validate()
    }
}

/// Connection pool bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    #[serde(default = "default_max_open_conns")]
    pub max_open_conns: u32,

    #[serde(default = "default_max_idle_conns")]
    pub max_idle_conns: u32,

    /// Recycle connections older than this; 0 disables recycling
    #[serde(default = "default_conn_max_lifetime_secs")]
    pub conn_max_lifetime_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open_conns: default_max_open_conns(),
            max_idle_conns: default_max_idle_conns(),
            conn_max_lifetime_secs: default_conn_max_lifetime_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_max_open_conns() -> u32 {
    10
}

fn default_max_idle_conns() -> u32 {
    2
}

fn default_conn_max_lifetime_secs() -> u64 {
    1800
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl PoolConfig {
    pub fn conn_max_lifetime(&self) -> Option<Duration> {
        (self.conn_max_lifetime_secs > 0).then(|| Duration::from_secs(self.conn_max_lifetime_secs))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.max_open_conns == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "database.pool.max_open_conns must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Load `migraph.yml` (or `migraph.yaml`) from a directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join(CONFIG_FILE);
        let yaml_path = dir.join("migraph.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Parse configuration text, expanding environment references first.
    pub fn parse(content: &str) -> CoreResult<Self> {
        let expanded = expand_env(content);
        let config: Config =
            serde_yaml::from_str(&expanded).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.migration.directory.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration.directory cannot be empty".to_string(),
            });
        }
        if !is_identifier(&self.migration.table_name) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migration.table_name '{}' must match [A-Za-z_][A-Za-z0-9_]*",
                    self.migration.table_name
                ),
            });
        }
        self.database.validate()
    }

    /// Migrations directory as a path
    pub fn migrations_dir(&self) -> PathBuf {
        PathBuf::from(&self.migration.directory)
    }

    pub fn table_name(&self) -> &str {
        &self.migration.table_name
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

static ENV_REF: OnceLock<Regex> = OnceLock::new();

/// Replace `${VAR}` and `$VAR` with the variable's value; unset variables become empty.
pub fn expand_env(input: &str) -> String {
    let re = ENV_REF.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("valid regex")
    });
    re.replace_all(input, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        std::env::var(name).unwrap_or_default()
    })
    .into_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
