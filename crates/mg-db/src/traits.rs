//! Database and transaction trait definitions

use crate::dialect::Dialect;
use crate::error::DbResult;
use crate::value::{Row, SqlValue};
use async_trait::async_trait;

/// Database abstraction for migraph
///
/// One implementation per engine, chosen from the configured driver.
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// SQL flavour used for bookkeeping statements
    fn dialect(&self) -> &'static dyn Dialect;

    /// Round-trip health check
    async fn ping(&self) -> DbResult<()>;

    /// Execute one parameterized statement, returns affected rows
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64>;

    /// Execute a script of one or more statements in autocommit mode
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a parameterized query and collect every row
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>>;

    /// Run a parameterized query and return its first row, if any
    async fn query_row(&self, sql: &str, params: &[SqlValue]) -> DbResult<Option<Row>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }

    /// Start a transaction. Dropping the handle without committing rolls it back.
    async fn begin(&self) -> DbResult<Box<dyn Transaction>>;
}

/// A transaction-scoped handle with the same read/write contract as [`Database`].
///
/// `commit` and `rollback` finish the transaction; any later call fails.
#[async_trait]
pub trait Transaction: Send {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<u64>;

    async fn execute_batch(&mut self, sql: &str) -> DbResult<()>;

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>>;

    async fn commit(&mut self) -> DbResult<()>;

    async fn rollback(&mut self) -> DbResult<()>;
}
