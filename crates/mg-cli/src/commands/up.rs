//! Up command implementation

use anyhow::{Context, Result};
use mg_core::Operation;
use tokio_util::sync::CancellationToken;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{connect, load_config};

/// Execute the up command
pub async fn execute(args: &UpArgs, global: &GlobalArgs, cancel: CancellationToken) -> Result<()> {
    mg_runner::validate_count(Operation::Up, args.count)?;
    let config = load_config(global)?;
    let db = connect(&config)?;

    mg_runner::up(db.as_ref(), &config, args.count, args.dry_run, cancel)
        .await
        .context("Up failed")?;
    Ok(())
}
