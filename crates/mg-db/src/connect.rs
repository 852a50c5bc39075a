//! Backend selection from configuration

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::postgres::PostgresBackend;
use crate::traits::Database;
use mg_core::{DatabaseConfig, Driver};
use std::sync::Arc;

/// Open the backend named by `config.driver`.
///
/// PostgreSQL pools connect lazily; use [`crate::ping_with_retry`] to wait for
/// the server.
pub fn connect(config: &DatabaseConfig) -> DbResult<Arc<dyn Database>> {
    let db: Arc<dyn Database> = match config.driver {
        Driver::DuckDb => {
            let path = config
                .path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| DbError::Config("duckdb requires a database path".to_string()))?;
            Arc::new(DuckDbBackend::new(path)?)
        }
        Driver::Postgres => Arc::new(PostgresBackend::connect_lazy(config)?),
    };
    log::debug!("Opened {} backend", db.db_type());
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_duckdb_in_memory() {
        let db = connect(&DatabaseConfig::duckdb_in_memory()).unwrap();
        assert_eq!(db.db_type(), "duckdb");
        db.ping().await.unwrap();
    }

    #[test]
    fn test_connect_duckdb_without_path() {
        let config = DatabaseConfig {
            driver: Driver::DuckDb,
            ..DatabaseConfig::default()
        };
        assert!(matches!(connect(&config), Err(DbError::Config(_))));
    }
}
