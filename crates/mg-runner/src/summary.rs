//! Post-run report

use mg_core::Operation;
use std::time::Duration;

/// One migration touched by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// `{timestamp}_{name}`
    pub name: String,
    pub operation: Operation,
    /// Zero for dry runs
    pub duration: Duration,
}

/// What a run did, in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub operation: Operation,
    pub dry_run: bool,
    pub migrations: Vec<MigrationOutcome>,
}

impl RunSummary {
    pub fn new(operation: Operation, dry_run: bool) -> Self {
        Self {
            operation,
            dry_run,
            migrations: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, name: String, duration: Duration) {
        self.migrations.push(MigrationOutcome {
            name,
            operation: self.operation,
            duration,
        });
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.migrations.iter().map(|m| m.name.as_str()).collect()
    }

    fn verb(&self) -> &'static str {
        if self.dry_run {
            "validated"
        } else {
            self.operation.past_tense()
        }
    }

    /// Human-readable report. Per-migration lines only appear when `verbose`.
    pub fn lines(&self, verbose: bool) -> Vec<String> {
        if self.is_empty() {
            return vec![format!("No migrations to {}", self.operation.infinitive())];
        }

        let mut lines = Vec::new();
        if verbose {
            lines.push("Migration Summary".to_string());
            lines.push(if self.dry_run {
                "Validated migrations:".to_string()
            } else {
                "Successful migrations:".to_string()
            });
            for m in &self.migrations {
                lines.push(format!(
                    "  \u{2713} {} ({}) - {:?}",
                    m.name, m.operation, m.duration
                ));
            }
        }

        let plural = if self.len() == 1 { "" } else { "s" };
        lines.push(format!(
            "Total: {} migration{plural} {}",
            self.len(),
            self.verb()
        ));
        lines
    }

    /// Emit the report through the logger.
    pub fn log(&self, verbose: bool) {
        for line in self.lines(verbose) {
            log::info!("{line}");
        }
    }
}
