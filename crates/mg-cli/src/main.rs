//! migraph CLI - DAG-ordered database migrations

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

mod cli;
mod commands;

use cli::Cli;
use commands::{add, down, export, ping, up};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received; stopping before the next statement");
            on_interrupt.cancel();
        }
    });

    match &cli.command {
        cli::Commands::Up(args) => up::execute(args, &cli.global, cancel).await,
        cli::Commands::Down(args) => down::execute(args, &cli.global, cancel).await,
        cli::Commands::Ping(args) => ping::execute(args, &cli.global, cancel).await,
        cli::Commands::Export(args) => export::execute(args, &cli.global),
        cli::Commands::Add(args) => add::execute(args, &cli.global),
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
