//! mg-runner - Migration runner for migraph
//!
//! This crate walks the migration graph in dependency order and applies or
//! rolls back each migration against a [`mg_db::Database`], keeping the
//! bookkeeping table in step.

pub mod error;
pub mod options;
pub mod runner;
pub mod summary;

pub use error::{RunnerError, RunnerResult};
pub use options::{validate_count, RunOptions};
pub use runner::Runner;
pub use summary::{MigrationOutcome, RunSummary};

use mg_core::{load_from_dir, Config, MigrationGraph, Operation};
use mg_db::Database;
use tokio_util::sync::CancellationToken;

/// Apply pending migrations. `count == 0` applies all of them.
pub async fn up(
    db: &dyn Database,
    config: &Config,
    count: i64,
    dry_run: bool,
    cancel: CancellationToken,
) -> RunnerResult<RunSummary> {
    run(db, config, Operation::Up, count, dry_run, cancel).await
}

/// Roll back the `count` most recent applied migrations.
pub async fn down(
    db: &dyn Database,
    config: &Config,
    count: i64,
    dry_run: bool,
    cancel: CancellationToken,
) -> RunnerResult<RunSummary> {
    run(db, config, Operation::Down, count, dry_run, cancel).await
}

async fn run(
    db: &dyn Database,
    config: &Config,
    operation: Operation,
    count: i64,
    dry_run: bool,
    cancel: CancellationToken,
) -> RunnerResult<RunSummary> {
    validate_count(operation, count)?;

    let graph = MigrationGraph::build(load_from_dir(&config.migrations_dir())?)?;
    let options = RunOptions::new(operation, graph, config.table_name())
        .with_count(count)
        .with_dry_run(dry_run)
        .with_verbose(config.verbose);

    let summary = Runner::new(db, cancel).run(&options).await?;
    summary.log(options.verbose);
    Ok(summary)
}
