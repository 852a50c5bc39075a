//! Migration definitions and bookkeeping records

use crate::sql::SqlQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Metadata document stored as `metadata.yaml` next to each migration's SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMetadata {
    /// Human-readable slug
    pub name: String,

    /// Creation instant in seconds since epoch; the unique graph key
    pub timestamp: i64,

    /// Free-text description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Timestamps of the migrations this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<i64>,

    /// Run the SQL outside any transaction (e.g. `CREATE INDEX CONCURRENTLY`)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_transaction: bool,
}

/// One migration unit: metadata plus its forward and reverse SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub timestamp: i64,
    pub description: String,
    pub parents: Vec<i64>,
    pub no_transaction: bool,
    pub up_query: SqlQuery,
    pub down_query: SqlQuery,
}

impl Definition {
    /// Assemble a definition from parsed metadata and SQL bodies.
    pub fn from_parts(metadata: MigrationMetadata, up_query: SqlQuery, down_query: SqlQuery) -> Self {
        Self {
            name: metadata.name,
            timestamp: metadata.timestamp,
            description: metadata.description,
            parents: metadata.parents,
            no_transaction: metadata.no_transaction,
            up_query,
            down_query,
        }
    }

    /// Canonical identity recorded in the bookkeeping table: `{timestamp}_{name}`.
    pub fn file_name(&self) -> String {
        format!("{}_{}", self.timestamp, self.name)
    }

    /// SQL body for the given direction.
    pub fn query_for(&self, operation: Operation) -> &SqlQuery {
        match operation {
            Operation::Up => &self.up_query,
            Operation::Down => &self.down_query,
        }
    }
}

/// Direction of a migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Up,
    Down,
}

impl Operation {
    pub fn is_up(self) -> bool {
        self == Operation::Up
    }

    pub fn is_down(self) -> bool {
        self == Operation::Down
    }

    /// Past-tense verb used in run summaries.
    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Up => "applied",
            Operation::Down => "rolled back",
        }
    }

    /// Infinitive used when nothing was eligible ("No migrations to apply").
    pub fn infinitive(self) -> &'static str {
        match self {
            Operation::Up => "apply",
            Operation::Down => "roll back",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Up => write!(f, "up"),
            Operation::Down => write!(f, "down"),
        }
    }
}

/// A row of the bookkeeping table: one applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationLog {
    /// Surrogate key
    pub id: i64,

    /// `Definition::file_name()` of the applied migration
    pub name: String,

    /// When the migration was applied
    pub migration_time: DateTime<Utc>,

    /// Wall-clock execution time of the SQL body
    pub duration: Duration,
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
