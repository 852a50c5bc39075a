//! Reads and writes of the bookkeeping table

use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::traits::{Database, Transaction};
use crate::value::{Row, SqlValue};
use chrono::{DateTime, Utc};
use mg_core::MigrationLog;
use std::time::Duration;

/// The bookkeeping table recording applied migrations.
#[derive(Debug, Clone)]
pub struct LogTable {
    name: String,
}

impl LogTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the table exists in the current schema.
    pub async fn exists(&self, db: &dyn Database) -> DbResult<bool> {
        let sql = db.dialect().table_exists();
        let row = db
            .query_row(&sql, &[SqlValue::from(self.name.as_str())])
            .await?;
        Ok(row
            .and_then(|r| r.first().and_then(SqlValue::as_i64))
            .is_some_and(|count| count > 0))
    }

    /// Create the table if absent.
    pub async fn ensure(&self, db: &dyn Database) -> DbResult<()> {
        log::debug!("Ensuring bookkeeping table {}", self.name);
        db.execute_batch(&db.dialect().create_log_table(&self.name))
            .await
    }

    /// Every recorded migration, oldest first.
    pub async fn applied(&self, db: &dyn Database) -> DbResult<Vec<MigrationLog>> {
        let rows = db.query(&db.dialect().select_log(&self.name), &[]).await?;
        rows.into_iter().map(decode_row).collect()
    }

    /// Record an applied migration inside `tx`.
    pub async fn insert(
        &self,
        tx: &mut dyn Transaction,
        dialect: &dyn Dialect,
        name: &str,
        started: DateTime<Utc>,
        duration: Duration,
    ) -> DbResult<()> {
        let duration_us = i64::try_from(duration.as_micros()).unwrap_or(i64::MAX);
        tx.execute(
            &dialect.insert_log(&self.name),
            &[
                SqlValue::from(name),
                SqlValue::Int(started.timestamp_micros()),
                SqlValue::Int(duration_us),
            ],
        )
        .await?;
        Ok(())
    }

    /// Remove a migration's record inside `tx`.
    pub async fn delete(&self, tx: &mut dyn Transaction, dialect: &dyn Dialect, name: &str) -> DbResult<()> {
        tx.execute(&dialect.delete_log(&self.name), &[SqlValue::from(name)])
            .await?;
        Ok(())
    }
}

fn decode_row(row: Row) -> DbResult<MigrationLog> {
    let malformed = || DbError::Internal(format!("unexpected bookkeeping row shape: {row:?}"));
    let id = row.first().and_then(SqlValue::as_i64).ok_or_else(malformed)?;
    let name = row
        .get(1)
        .and_then(SqlValue::as_str)
        .ok_or_else(malformed)?
        .to_string();
    let time_us = row.get(2).and_then(SqlValue::as_i64).ok_or_else(malformed)?;
    let duration_us = row.get(3).and_then(SqlValue::as_i64).ok_or_else(malformed)?;

    let migration_time = DateTime::from_timestamp_micros(time_us).ok_or_else(malformed)?;
    Ok(MigrationLog {
        id,
        name,
        migration_time,
        duration: Duration::from_micros(u64::try_from(duration_us).unwrap_or_default()),
    })
}

#[cfg(test)]
#[path = "log_table_test.rs"]
mod tests;
