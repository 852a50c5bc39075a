//! Per-engine SQL for the bookkeeping table
//!
//! Times cross the boundary as integer microseconds so both engines share one
//! row shape: `(id, name, migration_time_us, duration_us)`.

/// Engine-specific statement text.
pub trait Dialect: Send + Sync {
    /// Quote an identifier, doubling embedded quotes.
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Bind placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Idempotent DDL creating the bookkeeping table (may hold several statements).
    fn create_log_table(&self, table: &str) -> String;

    /// Idempotent index on the `name` column, the key every delete filters on.
    fn create_log_index(&self, table: &str) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (name);",
            self.quote_identifier(&format!("{table}_name_idx")),
            self.quote_identifier(table)
        )
    }

    /// Count of tables named by parameter 1 in the current schema.
    fn table_exists(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = {}",
            self.placeholder(1)
        )
    }

    /// All bookkeeping rows ordered by id.
    fn select_log(&self, table: &str) -> String;

    /// Insert `(name, migration_time_us, duration_us)`.
    fn insert_log(&self, table: &str) -> String;

    /// Delete the row whose name equals parameter 1.
    fn delete_log(&self, table: &str) -> String {
        format!(
            "DELETE FROM {} WHERE name = {}",
            self.quote_identifier(table),
            self.placeholder(1)
        )
    }
}

/// DuckDB flavour
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl Dialect for DuckDbDialect {
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn create_log_table(&self, table: &str) -> String {
        let seq = self.quote_identifier(&format!("{table}_id_seq"));
        format!(
            "CREATE SEQUENCE IF NOT EXISTS {seq};\n\
             CREATE TABLE IF NOT EXISTS {table} (\n    \
             id BIGINT PRIMARY KEY DEFAULT nextval('{seq_name}'),\n    \
             name VARCHAR NOT NULL,\n    \
             migration_time TIMESTAMP NOT NULL,\n    \
             duration INTERVAL NOT NULL\n\
             );\n{index}",
            seq = seq,
            seq_name = format!("{table}_id_seq").replace('\'', "''"),
            index = self.create_log_index(table),
            table = self.quote_identifier(table),
        )
    }

    fn select_log(&self, table: &str) -> String {
        format!(
            "SELECT id, name, epoch_us(migration_time), \
             CAST(epoch(duration) * 1000000 AS BIGINT) \
             FROM {} ORDER BY id",
            self.quote_identifier(table)
        )
    }

    fn insert_log(&self, table: &str) -> String {
        format!(
            "INSERT INTO {} (name, migration_time, duration) \
             VALUES (?, make_timestamp(?), to_microseconds(?))",
            self.quote_identifier(table)
        )
    }
}

/// PostgreSQL flavour
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn create_log_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    \
             id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,\n    \
             name TEXT NOT NULL,\n    \
             migration_time TIMESTAMPTZ NOT NULL DEFAULT now(),\n    \
             duration INTERVAL NOT NULL\n\
             );\n{}",
            self.quote_identifier(table),
            self.create_log_index(table)
        )
    }

    fn select_log(&self, table: &str) -> String {
        format!(
            "SELECT id, name, \
             CAST(extract(epoch FROM migration_time) * 1000000 AS BIGINT), \
             CAST(extract(epoch FROM duration) * 1000000 AS BIGINT) \
             FROM {} ORDER BY id",
            self.quote_identifier(table)
        )
    }

    fn insert_log(&self, table: &str) -> String {
        format!(
            "INSERT INTO {} (name, migration_time, duration) VALUES \
             ($1, to_timestamp($2::double precision / 1000000), \
             make_interval(secs => $3::double precision / 1000000))",
            self.quote_identifier(table)
        )
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
