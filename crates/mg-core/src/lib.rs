//! mg-core - Core library for migraph
//!
//! This crate provides migration definitions, the definition loader and its
//! filesystem providers, SQL canonicalization, the dependency graph, graph
//! export, configuration parsing and migration scaffolding.

pub mod config;
pub mod definition;
pub mod error;
pub mod export;
pub mod fs;
pub mod graph;
pub mod loader;
pub mod scaffold;
pub mod sql;

pub use config::{Config, DatabaseConfig, Driver, MigrationConfig, PoolConfig};
pub use definition::{Definition, MigrationLog, MigrationMetadata, Operation};
pub use error::{CoreError, CoreResult};
pub use export::{export_graph, ExportFormat};
pub use fs::{DirEntry, DirFs, FileSystem, MemoryFs};
pub use graph::MigrationGraph;
pub use loader::{load_definitions, load_from_dir};
pub use scaffold::{add_migration, sanitize_name, CreatedMigration};
pub use sql::SqlQuery;
