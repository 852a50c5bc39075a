//! DuckDB database backend implementation

use crate::dialect::{Dialect, DuckDbDialect};
use crate::error::{DbError, DbResult};
use crate::traits::{Database, Transaction};
use crate::value::{Row, SqlValue};
use async_trait::async_trait;
use duckdb::types::{ToSql, ToSqlOutput, Value, ValueRef};
use duckdb::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// DuckDB database backend
///
/// DuckDB allows a single writer per file, so the backend owns exactly one
/// connection. An open [`DuckDbTransaction`] holds that connection until it
/// finishes; do not call the backend from inside a transaction callback.
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| match DbError::from(e) {
            busy @ DbError::Busy(_) => busy,
            other => DbError::ConnectionError(other.to_string()),
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Boolean(*b)),
            SqlValue::Int(v) => ToSqlOutput::Owned(Value::BigInt(*v)),
            SqlValue::Float(v) => ToSqlOutput::Owned(Value::Double(*v)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn from_duckdb_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Bool(b),
        Value::TinyInt(v) => SqlValue::Int(v.into()),
        Value::SmallInt(v) => SqlValue::Int(v.into()),
        Value::Int(v) => SqlValue::Int(v.into()),
        Value::BigInt(v) => SqlValue::Int(v),
        Value::HugeInt(v) => SqlValue::Int(v as i64),
        Value::UTinyInt(v) => SqlValue::Int(v.into()),
        Value::USmallInt(v) => SqlValue::Int(v.into()),
        Value::UInt(v) => SqlValue::Int(v.into()),
        Value::UBigInt(v) => SqlValue::Int(v as i64),
        Value::Float(v) => SqlValue::Float(v.into()),
        Value::Double(v) => SqlValue::Float(v),
        Value::Text(s) => SqlValue::Text(s),
        other => SqlValue::Text(format!("{other:?}")),
    }
}

fn execute_sync(conn: &Connection, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
    let affected = conn.execute(sql, params_from_iter(params.iter()))?;
    Ok(affected as u64)
}

fn query_sync(conn: &Connection, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let columns = row.as_ref().column_count();
        let mut values = Vec::with_capacity(columns);
        for i in 0..columns {
            let value: Value = row.get(i)?;
            values.push(from_duckdb_value(value));
        }
        out.push(values);
    }
    Ok(out)
}

#[async_trait]
impl Database for DuckDbBackend {
    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn dialect(&self) -> &'static dyn Dialect {
        &DuckDbDialect
    }

    async fn ping(&self) -> DbResult<()> {
        let conn = self.conn.lock().await;
        query_sync(&conn, "SELECT 1", &[])?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        let conn = self.conn.lock().await;
        execute_sync(&conn, sql, params)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql)?;
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
        let conn = self.conn.lock().await;
        query_sync(&conn, sql, params)
    }

    async fn begin(&self) -> DbResult<Box<dyn Transaction>> {
        let conn = Arc::clone(&self.conn).lock_owned().await;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("failed to begin: {e}")))?;
        Ok(Box::new(DuckDbTransaction {
            conn,
            finished: false,
        }))
    }
}

/// An open DuckDB transaction holding the backend's only connection.
pub struct DuckDbTransaction {
    conn: OwnedMutexGuard<Connection>,
    finished: bool,
}

impl DuckDbTransaction {
    fn ensure_open(&self) -> DbResult<()> {
        if self.finished {
            return Err(DbError::TransactionError(
                "transaction already completed".to_string(),
            ));
        }
        Ok(())
    }

    fn finish(&mut self, statement: &str) -> DbResult<()> {
        self.ensure_open()?;
        self.finished = true;
        self.conn.execute_batch(statement)?;
        Ok(())
    }
}

#[async_trait]
impl Transaction for DuckDbTransaction {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        self.ensure_open()?;
        execute_sync(&self.conn, sql, params)
    }

    async fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.ensure_open()?;
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
        self.ensure_open()?;
        query_sync(&self.conn, sql, params)
    }

    async fn commit(&mut self) -> DbResult<()> {
        self.finish("COMMIT")
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.finish("ROLLBACK")
    }
}

impl Drop for DuckDbTransaction {
    fn drop(&mut self) {
        if !self.finished {
            log::warn!("DuckDB transaction dropped while open; rolling back");
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::error!("Rollback of abandoned transaction failed: {e}");
            }
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
