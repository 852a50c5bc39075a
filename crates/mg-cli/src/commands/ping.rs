//! Ping command implementation

use anyhow::{Context, Result};
use mg_db::{ping_with_retry, RetryPolicy};
use tokio_util::sync::CancellationToken;

use crate::cli::{GlobalArgs, PingArgs};
use crate::commands::common::{connect, load_config};

/// Execute the ping command
pub async fn execute(args: &PingArgs, global: &GlobalArgs, cancel: CancellationToken) -> Result<()> {
    let config = load_config(global)?;
    let db = connect(&config)?;

    let policy = RetryPolicy::new(args.retry_count, args.retry_delay).with_jitter(true);
    log::debug!(
        "Pinging {} with up to {} retries starting at {:?}",
        db.db_type(),
        policy.retries(),
        policy.initial_delay()
    );

    ping_with_retry(db.as_ref(), &policy, &cancel)
        .await
        .context("Database is not reachable")?;
    println!("Database is reachable ({})", db.db_type());
    Ok(())
}
