//! Migration execution

use crate::error::{RunnerError, RunnerResult};
use crate::options::RunOptions;
use crate::summary::RunSummary;
use chrono::{DateTime, Utc};
use mg_core::{Definition, Operation};
use mg_db::{with_transaction, Database, DbResult, LogTable};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Applies or rolls back migrations one at a time in dependency order.
///
/// The runner stops at the first failure; nothing after a failed migration
/// is attempted.
pub struct Runner<'a> {
    db: &'a dyn Database,
    cancel: CancellationToken,
}

impl<'a> Runner<'a> {
    pub fn new(db: &'a dyn Database, cancel: CancellationToken) -> Self {
        Self { db, cancel }
    }

    /// Execute a run and return what it touched.
    pub async fn run(&self, options: &RunOptions) -> RunnerResult<RunSummary> {
        options.validate()?;

        let operation = options.operation;
        let table = LogTable::new(&options.table_name);
        let applied = self.applied_names(&table, options.dry_run).await?;
        let order = options.graph.topological_sort(operation.is_up())?;
        let limit = options.limit();

        log::debug!(
            "Running {operation} over {} migration(s), {} already applied",
            order.len(),
            applied.len()
        );

        let mut summary = RunSummary::new(operation, options.dry_run);
        for def in order {
            if limit.is_some_and(|n| summary.len() >= n) {
                log::debug!("Reached count limit of {}", options.count);
                break;
            }

            let name = def.file_name();
            let is_applied = applied.contains(&name);
            let skip = match operation {
                Operation::Up => is_applied,
                Operation::Down => !is_applied,
            };
            if skip {
                log::debug!("Skipping {name}");
                continue;
            }

            self.check_cancelled()?;

            if options.dry_run {
                log::info!("[dry run] Would {} {name}", operation.infinitive());
                summary.record(name, Duration::ZERO);
                continue;
            }

            let duration = self.execute(&table, def, operation).await?;
            log::info!("{} {name} ({duration:?})", capitalize(operation.past_tense()));
            summary.record(name, duration);
        }

        Ok(summary)
    }

    fn check_cancelled(&self) -> RunnerResult<()> {
        if self.cancel.is_cancelled() {
            return Err(RunnerError::Cancelled);
        }
        Ok(())
    }

    /// Names recorded in the bookkeeping table.
    ///
    /// A dry run never creates the table; a missing table reads as empty.
    async fn applied_names(&self, table: &LogTable, dry_run: bool) -> RunnerResult<HashSet<String>> {
        self.check_cancelled()?;
        if dry_run {
            if !table.exists(self.db).await? {
                log::debug!("Bookkeeping table {} does not exist yet", table.name());
                return Ok(HashSet::new());
            }
        } else {
            table.ensure(self.db).await?;
        }

        self.check_cancelled()?;
        let logs = table.applied(self.db).await?;
        Ok(logs.into_iter().map(|log| log.name).collect())
    }

    async fn execute(&self, table: &LogTable, def: &Definition, operation: Operation) -> RunnerResult<Duration> {
        let name = def.file_name();
        if !def.query_for(operation).has_statements() {
            log::warn!(
                "Migration {name} has no SQL statements in its {operation} body; recording it as {} anyway",
                operation.past_tense()
            );
        }

        let result = if def.no_transaction {
            self.execute_outside_transaction(table, def, operation).await
        } else {
            self.execute_in_transaction(table, def, operation)
                .await
                .map_err(|source| RunnerError::MigrationFailed {
                    operation,
                    migration: name.clone(),
                    source,
                })
        };

        if let Err(err) = &result {
            log::error!("Migration {name} failed: {err}");
        }
        result
    }

    /// Body and bookkeeping change commit together or not at all.
    async fn execute_in_transaction(
        &self,
        table: &LogTable,
        def: &Definition,
        operation: Operation,
    ) -> DbResult<Duration> {
        let dialect = self.db.dialect();
        let table = table.clone();
        let name = def.file_name();
        let query = def.query_for(operation);
        let sql = query.has_statements().then(|| query.as_str().to_string());

        with_transaction(self.db, move |tx| {
            Box::pin(async move {
                let started = Utc::now();
                let clock = Instant::now();
                if let Some(sql) = &sql {
                    tx.execute_batch(sql).await?;
                }
                let duration = clock.elapsed();
                match operation {
                    Operation::Up => table.insert(tx, dialect, &name, started, duration).await?,
                    Operation::Down => table.delete(tx, dialect, &name).await?,
                }
                Ok(duration)
            })
        })
        .await
    }

    /// Body runs in autocommit mode, then the bookkeeping change runs in its own
    /// transaction. A failure of the second step leaves the two out of sync.
    async fn execute_outside_transaction(
        &self,
        table: &LogTable,
        def: &Definition,
        operation: Operation,
    ) -> RunnerResult<Duration> {
        let name = def.file_name();
        let query = def.query_for(operation);
        log::warn!(
            "Migration {name} runs outside a transaction; a failure part-way cannot be rolled back"
        );
        let statements = query.statement_count();
        if statements > 1 {
            log::warn!(
                "Migration {name} has {statements} statements; each commits on its own without a transaction"
            );
        }

        let started = Utc::now();
        let clock = Instant::now();
        if statements > 0 {
            self.db
                .execute_batch(query.as_str())
                .await
                .map_err(|source| RunnerError::MigrationFailed {
                    operation,
                    migration: name.clone(),
                    source,
                })?;
        }
        let duration = clock.elapsed();

        self.record(table, name.clone(), operation, started, duration)
            .await
            .map_err(|source| RunnerError::BookkeepingDrift {
                migration: name,
                source,
            })?;
        Ok(duration)
    }

    async fn record(
        &self,
        table: &LogTable,
        name: String,
        operation: Operation,
        started: DateTime<Utc>,
        duration: Duration,
    ) -> DbResult<()> {
        let dialect = self.db.dialect();
        let table = table.clone();
        with_transaction(self.db, move |tx| {
            Box::pin(async move {
                match operation {
                    Operation::Up => table.insert(tx, dialect, &name, started, duration).await,
                    Operation::Down => table.delete(tx, dialect, &name).await,
                }
            })
        })
        .await
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
