//! Scoped transactions with guaranteed commit/rollback discipline

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Transaction};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Run `f` inside a transaction.
///
/// The callback's own result decides the outcome:
/// - `Ok` commits; a commit failure is returned as [`DbError::CommitFailed`].
/// - `Err` rolls back and returns the callback's error, or
///   [`DbError::RollbackFailed`] carrying both errors if the rollback fails too.
/// - A panic rolls back, then resumes unwinding.
///
/// The returned future may borrow only the handle, so move owned data into it.
/// Calling back into `db` from inside it may deadlock on single-connection
/// engines.
pub async fn with_transaction<T, F>(db: &dyn Database, f: F) -> DbResult<T>
where
    F: for<'t> FnOnce(&'t mut dyn Transaction) -> BoxFuture<'t, DbResult<T>>,
{
    let mut tx = db.begin().await?;
    let outcome = AssertUnwindSafe(f(tx.as_mut())).catch_unwind().await;

    match outcome {
        Ok(Ok(value)) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(e) => {
                log::error!("Transaction commit failed: {e}");
                Err(DbError::CommitFailed(Box::new(e)))
            }
        },
        Ok(Err(err)) => match tx.rollback().await {
            Ok(()) => {
                log::debug!("Transaction rolled back: {err}");
                Err(err)
            }
            Err(rollback) => {
                log::error!("Rollback failed after error ({err}): {rollback}");
                Err(DbError::RollbackFailed {
                    source: Box::new(err),
                    rollback: Box::new(rollback),
                })
            }
        },
        Err(panic) => {
            if let Err(rollback) = tx.rollback().await {
                log::error!("Rollback after panic failed: {rollback}");
            }
            std::panic::resume_unwind(panic)
        }
    }
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
