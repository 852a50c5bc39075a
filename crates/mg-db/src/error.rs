//! Error types for mg-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Database locked or busy (D003)
    #[error("[D003] Database is busy: {0}")]
    Busy(String),

    /// Transaction could not be started or is no longer usable (D004)
    #[error("[D004] Transaction error: {0}")]
    TransactionError(String),

    /// Commit failed after the callback succeeded (D005)
    #[error("[D005] Transaction commit failed: {0}")]
    CommitFailed(#[source] Box<DbError>),

    /// Rollback failed while handling another error (D006)
    #[error("[D006] {source}; rollback also failed: {rollback}")]
    RollbackFailed {
        source: Box<DbError>,
        rollback: Box<DbError>,
    },

    /// Transient error persisted through every retry (D007)
    #[error("[D007] failed after {retries} retries: {source}")]
    RetriesExhausted {
        retries: u32,
        source: Box<DbError>,
    },

    /// Cancellation observed at a suspension point (D008)
    #[error("[D008] Operation cancelled")]
    Cancelled,

    /// Invalid connection settings (D009)
    #[error("[D009] Invalid database configuration: {0}")]
    Config(String),

    /// Internal error (D010)
    #[error("[D010] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// PostgreSQL SQLSTATE codes worth retrying besides the `08` connection class.
const TRANSIENT_SQLSTATES: &[&str] = &["57P01", "57P02", "57P03", "53300", "53301"];

/// Message fragments that mark lock contention or a dropped connection.
const TRANSIENT_MESSAGES: &[&str] = &[
    "database is locked",
    "database is busy",
    "locked:",
    "could not set lock",
    "resource deadlock avoided",
    "database schema has changed",
    "connection refused",
    "connection reset",
    "broken pipe",
];

impl DbError {
    /// True when retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::ConnectionError(_) | DbError::Busy(_))
    }
}

/// Whether a PostgreSQL SQLSTATE denotes a transient condition.
pub fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || TRANSIENT_SQLSTATES.contains(&code)
}

/// Whether an error message describes lock contention or a dropped connection.
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MESSAGES.iter().any(|m| lower.contains(m))
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured codes; classify by message
        let msg = err.to_string();
        if is_transient_message(&msg) {
            DbError::Busy(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.to_string();
                match db_err.code() {
                    Some(code) if is_transient_sqlstate(&code) => {
                        DbError::ConnectionError(format!("{msg} (SQLSTATE {code})"))
                    }
                    Some(code) => DbError::ExecutionError(format!("{msg} (SQLSTATE {code})")),
                    None => DbError::ExecutionError(msg),
                }
            }
            sqlx::Error::Io(e) => DbError::ConnectionError(e.to_string()),
            sqlx::Error::Tls(e) => DbError::ConnectionError(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError("timed out acquiring a pooled connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::ConnectionError("connection pool closed".to_string()),
            sqlx::Error::WorkerCrashed => {
                DbError::ConnectionError("connection worker crashed".to_string())
            }
            sqlx::Error::Configuration(e) => DbError::Config(e.to_string()),
            other => {
                let msg = other.to_string();
                if is_transient_message(&msg) {
                    DbError::ConnectionError(msg)
                } else {
                    DbError::ExecutionError(msg)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
