//! Canonical SQL bodies for migration files

use serde::{Serialize, Serializer};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::fmt;

/// Marker that fenced YAML frontmatter in older migration files.
const FRONTMATTER_MARKER: &str = "-- +++\n";

/// The SQL body of one direction of a migration.
///
/// Holds the canonicalized text read from `up.sql` / `down.sql`. The body is
/// sent to the database verbatim, so no placeholder escaping is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlQuery(String);

impl SqlQuery {
    /// Build a query from raw file contents, canonicalizing it first.
    pub fn from_file_contents(raw: &str) -> Self {
        Self(canonicalize_query(raw))
    }

    /// Wrap already-canonical SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// Return the SQL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the body contains no SQL.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// False when the body holds nothing but comments and whitespace.
    pub fn has_statements(&self) -> bool {
        self.statement_count() > 0
    }

    /// Number of non-empty `;`-separated statements in the body.
    ///
    /// Semicolons inside string literals, quoted identifiers, comments and
    /// dollar-quoted bodies do not split statements.
    pub fn statement_count(&self) -> usize {
        let dialect = PostgreSqlDialect {};
        match Tokenizer::new(&dialect, &self.0).tokenize() {
            Ok(tokens) => count_statements(&tokens),
            Err(e) => {
                log::debug!("SQL tokenizer failed ({e}); counting statements by plain split");
                self.0
                    .split(';')
                    .filter(|part| !part.trim().is_empty())
                    .count()
            }
        }
    }
}

fn count_statements(tokens: &[Token]) -> usize {
    let mut count = 0;
    let mut has_content = false;
    for token in tokens {
        match token {
            Token::SemiColon => {
                if has_content {
                    count += 1;
                }
                has_content = false;
            }
            Token::Whitespace(_) | Token::EOF => {}
            _ => has_content = true,
        }
    }
    if has_content {
        count += 1;
    }
    count
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SqlQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Remove historic cruft so older migration files stay loadable.
///
/// Strips embedded YAML frontmatter (everything up to the second `-- +++`
/// marker) and a single outer `BEGIN;` / `COMMIT;` wrapper.
pub fn canonicalize_query(query: &str) -> String {
    let mut body = query;
    let parts: Vec<&str> = query.splitn(3, FRONTMATTER_MARKER).collect();
    if parts.len() == 3 {
        body = parts[2];
    }

    let trimmed = body.trim();
    let trimmed = trimmed.strip_prefix("BEGIN;").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("COMMIT;").unwrap_or(trimmed);
    trimmed.trim().to_string()
}

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
