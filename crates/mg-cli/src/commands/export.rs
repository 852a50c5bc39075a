//! Export command implementation

use anyhow::{Context, Result};
use mg_core::export_graph;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::cli::{ExportArgs, GlobalArgs};
use crate::commands::common::load_config;

/// Execute the export command
pub fn execute(args: &ExportArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
            let mut writer = BufWriter::new(file);
            export_graph(&mut writer, &config, args.format).context("Export failed")?;
            writer.flush().with_context(|| format!("Failed to write {path}"))?;
            log::info!("Wrote {} graph to {path}", args.format);
        }
        None => {
            let mut stdout = io::stdout().lock();
            export_graph(&mut stdout, &config, args.format).context("Export failed")?;
        }
    }
    Ok(())
}
