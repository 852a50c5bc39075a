//! mg-db - Database access layer for migraph
//!
//! This crate provides the `Database` and `Transaction` traits with DuckDB
//! and PostgreSQL implementations, the bookkeeping table, the scoped
//! transaction helper and retry with exponential backoff.

pub mod connect;
pub mod dialect;
pub mod duckdb;
pub mod error;
pub mod log_table;
pub mod postgres;
pub mod retry;
pub mod traits;
pub mod transaction;
pub mod value;

pub use connect::connect;
pub use dialect::{Dialect, DuckDbDialect, PostgresDialect};
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use log_table::LogTable;
pub use mg_core::PoolConfig;
pub use postgres::PostgresBackend;
pub use retry::{ping_with_retry, with_retry, RetryPolicy};
pub use traits::{Database, Transaction};
pub use transaction::with_transaction;
pub use value::{Row, SqlValue};
