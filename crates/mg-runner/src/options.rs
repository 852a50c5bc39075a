//! Runner invocation parameters

use crate::error::{RunnerError, RunnerResult};
use mg_core::{MigrationGraph, Operation};

/// Parameters for one runner invocation
#[derive(Debug)]
pub struct RunOptions {
    /// Direction of the run
    pub operation: Operation,

    /// Migrations to consider
    pub graph: MigrationGraph,

    /// Bookkeeping table name
    pub table_name: String,

    /// Report what would run without touching the database
    pub dry_run: bool,

    /// List every touched migration in the summary
    pub verbose: bool,

    /// Maximum migrations to execute; 0 means unlimited (up only)
    pub count: i64,
}

impl RunOptions {
    pub fn new(operation: Operation, graph: MigrationGraph, table_name: impl Into<String>) -> Self {
        Self {
            operation,
            graph,
            table_name: table_name.into(),
            dry_run: false,
            verbose: false,
            count: if operation.is_down() { 1 } else { 0 },
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> RunnerResult<()> {
        validate_count(self.operation, self.count)
    }

    /// Count as an execution limit, `None` when unlimited.
    pub(crate) fn limit(&self) -> Option<usize> {
        usize::try_from(self.count).ok().filter(|&n| n > 0)
    }
}

/// Up accepts any non-negative count; down needs at least one.
pub fn validate_count(operation: Operation, count: i64) -> RunnerResult<()> {
    let reason = match operation {
        Operation::Up if count < 0 => "must be zero (unlimited) or positive",
        Operation::Down if count < 1 => "must be at least 1",
        _ => return Ok(()),
    };
    Err(RunnerError::InvalidCount {
        operation,
        count,
        reason,
    })
}
