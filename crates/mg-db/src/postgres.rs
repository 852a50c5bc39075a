//! PostgreSQL database backend implementation

use crate::dialect::{Dialect, PostgresDialect};
use crate::error::{DbError, DbResult};
use crate::traits::{Database, Transaction};
use crate::value::{Row, SqlValue};
use async_trait::async_trait;
use mg_core::{DatabaseConfig, PoolConfig};
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgSslMode};
use sqlx::query::Query;
use sqlx::{Column, Executor, Postgres, Row as _, TypeInfo};
use std::str::FromStr;

/// PostgreSQL database backend over a bounded sqlx pool
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Build the pool without connecting; the first statement opens a connection.
    pub fn connect_lazy(config: &DatabaseConfig) -> DbResult<Self> {
        let options = connect_options(config)?;
        let pool = pool_options(&config.pool).connect_lazy_with(options);
        Ok(Self { pool })
    }
}

/// Connection options from either `url` or the discrete fields.
pub fn connect_options(config: &DatabaseConfig) -> DbResult<PgConnectOptions> {
    let mut options = match config.url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => PgConnectOptions::from_str(url).map_err(|e| DbError::Config(e.to_string()))?,
        None => {
            let mut options = PgConnectOptions::new();
            if let Some(host) = &config.host {
                options = options.host(host);
            }
            if let Some(port) = config.port {
                options = options.port(port);
            }
            if let Some(user) = &config.user {
                options = options.username(user);
            }
            if let Some(password) = &config.password {
                options = options.password(password);
            }
            if let Some(name) = &config.name {
                options = options.database(name);
            }
            options
        }
    };

    if let Some(mode) = config.sslmode.as_deref().filter(|m| !m.is_empty()) {
        let mode = PgSslMode::from_str(mode).map_err(|e| DbError::Config(e.to_string()))?;
        options = options.ssl_mode(mode);
    }
    Ok(options)
}

/// Pool bounds from configuration.
pub fn pool_options(pool: &PoolConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(pool.max_open_conns)
        .min_connections(pool.max_idle_conns.min(pool.max_open_conns))
        .acquire_timeout(pool.connect_timeout())
        .max_lifetime(pool.conn_max_lifetime())
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn decode_row(row: &PgRow) -> DbResult<Row> {
    let mut values = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(i)?.map(SqlValue::Bool),
            "INT2" => row.try_get::<Option<i16>, _>(i)?.map(|v| SqlValue::Int(v.into())),
            "INT4" => row.try_get::<Option<i32>, _>(i)?.map(|v| SqlValue::Int(v.into())),
            "INT8" => row.try_get::<Option<i64>, _>(i)?.map(SqlValue::Int),
            "FLOAT4" => row.try_get::<Option<f32>, _>(i)?.map(|v| SqlValue::Float(v.into())),
            "FLOAT8" => row.try_get::<Option<f64>, _>(i)?.map(SqlValue::Float),
            _ => row.try_get::<Option<String>, _>(i)?.map(SqlValue::Text),
        };
        values.push(value.unwrap_or(SqlValue::Null));
    }
    Ok(values)
}

#[async_trait]
impl Database for PostgresBackend {
    fn db_type(&self) -> &'static str {
        "postgres"
    }

    fn dialect(&self) -> &'static dyn Dialect {
        &PostgresDialect
    }

    async fn ping(&self) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::Connection::ping(&mut *conn).await?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        let result = bind_params(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        // No bind arguments: sent over the simple query protocol, which accepts several statements
        self.pool.execute(sql).await?;
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn begin(&self) -> DbResult<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx: Some(tx) }))
    }
}

/// An open PostgreSQL transaction. sqlx rolls it back if dropped unfinished.
pub struct PostgresTransaction {
    tx: Option<sqlx::Transaction<'static, Postgres>>,
}

impl PostgresTransaction {
    fn open(&mut self) -> DbResult<&mut sqlx::Transaction<'static, Postgres>> {
        self.tx.as_mut().ok_or_else(|| {
            DbError::TransactionError("transaction already completed".to_string())
        })
    }

    fn take(&mut self) -> DbResult<sqlx::Transaction<'static, Postgres>> {
        self.tx.take().ok_or_else(|| {
            DbError::TransactionError("transaction already completed".to_string())
        })
    }
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        let tx = self.open()?;
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        let tx = self.open()?;
        (&mut **tx).execute(sql).await?;
        Ok(())
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
        let tx = self.open()?;
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut **tx)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn commit(&mut self) -> DbResult<()> {
        self.take()?.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.take()?.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
