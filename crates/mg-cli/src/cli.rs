//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use mg_core::ExportFormat;

/// migraph - apply and roll back database migrations in dependency order
#[derive(Parser, Debug)]
#[command(name = "mg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: ./migraph.yml)
    #[arg(short, long, global = true, env = "MIGRAPH_CONFIG")]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Up(UpArgs),

    /// Roll back applied migrations, newest first
    Down(DownArgs),

    /// Check that the database is reachable
    Ping(PingArgs),

    /// Print the migration graph
    Export(ExportArgs),

    /// Create a new migration depending on the current leaves
    Add(AddArgs),
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Apply at most this many migrations (0 = all)
    #[arg(short = 'n', long, default_value_t = 0, allow_negative_numbers = true)]
    pub count: i64,

    /// Show what would be applied without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Roll back this many migrations
    #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
    pub count: i64,

    /// Show what would be rolled back without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the ping command
#[derive(Args, Debug)]
pub struct PingArgs {
    /// Retries after the first attempt (clamped to 0..=7)
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    pub retry_count: i64,

    /// Initial delay between retries in milliseconds (clamped to 100..=3000)
    #[arg(long, default_value_t = 500)]
    pub retry_delay: i64,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format: dot or json
    #[arg(short, long, default_value = "dot")]
    pub format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Migration name; sanitized to lowercase letters, digits and underscores
    pub name: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
