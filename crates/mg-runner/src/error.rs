//! Error types for mg-runner

use mg_core::{CoreError, Operation};
use mg_db::DbError;
use thiserror::Error;

/// Runner errors
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Count rejected before any work (R001)
    #[error("[R001] Invalid count {count} for {operation}: {reason}")]
    InvalidCount {
        operation: Operation,
        count: i64,
        reason: &'static str,
    },

    /// Loading or graph construction failed (R002)
    #[error("[R002] {0}")]
    Core(#[from] CoreError),

    /// Database error outside any single migration (R003)
    #[error("[R003] {0}")]
    Db(#[from] DbError),

    /// A migration failed; nothing after it was attempted (R004)
    #[error("[R004] Failed to {} migration {migration}: {source}", .operation.infinitive())]
    MigrationFailed {
        operation: Operation,
        migration: String,
        #[source]
        source: DbError,
    },

    /// Non-transactional body ran but its bookkeeping write failed (R005)
    #[error(
        "[R005] Migration {migration} ran outside a transaction but recording it failed: {source}. \
         The schema and the bookkeeping table are now out of sync; reconcile manually"
    )]
    BookkeepingDrift {
        migration: String,
        #[source]
        source: DbError,
    },

    /// Cancellation observed between migrations (R006)
    #[error("[R006] Run cancelled")]
    Cancelled,
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
