//! Down command implementation

use anyhow::{Context, Result};
use mg_core::Operation;
use tokio_util::sync::CancellationToken;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{connect, load_config};

/// Execute the down command
pub async fn execute(args: &DownArgs, global: &GlobalArgs, cancel: CancellationToken) -> Result<()> {
    mg_runner::validate_count(Operation::Down, args.count)?;
    let config = load_config(global)?;
    let db = connect(&config)?;

    mg_runner::down(db.as_ref(), &config, args.count, args.dry_run, cancel)
        .await
        .context("Down failed")?;
    Ok(())
}
