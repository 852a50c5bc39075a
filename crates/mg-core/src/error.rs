//! Error types for mg-core

use thiserror::Error;

/// Core error type for migraph
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}. Provide one via --config or create migraph.yml in the current directory")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Migrations directory not found
    #[error("[E004] Migrations directory does not exist: {path}")]
    MigrationsDirNotFound { path: String },

    /// E005: A migration directory is missing a file or has bad metadata
    #[error("[E005] Malformed migration definition in '{directory}': {reason}")]
    MalformedDefinition { directory: String, reason: String },

    /// E006: Two definitions share the same timestamp
    #[error("[E006] Duplicate migration timestamp {timestamp} ({name})")]
    DuplicateMigration { timestamp: i64, name: String },

    /// E007: A parent timestamp does not resolve to a known migration
    #[error("[E007] Migration {migration} references non-existent parent timestamp {parent}")]
    MissingParent { migration: String, parent: i64 },

    /// E008: Adding an edge would close a cycle
    #[error("[E008] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E009: Same parent listed twice
    #[error("[E009] Migration {migration} lists parent {parent} more than once")]
    DuplicateParent { migration: String, parent: i64 },

    /// E010: Lookup of an unknown vertex
    #[error("[E010] Migration not found: {timestamp}")]
    MigrationNotFound { timestamp: i64 },

    /// E011: Export requested on an empty graph
    #[error("[E011] No migrations found")]
    NoMigrations,

    /// E012: Unknown export format
    #[error("[E012] Unsupported export format: {format} (expected 'dot' or 'json')")]
    UnsupportedExportFormat { format: String },

    /// E013: Migration name sanitizes to nothing
    #[error("[E013] Invalid migration name '{name}': must contain at least one letter or digit")]
    InvalidMigrationName { name: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
