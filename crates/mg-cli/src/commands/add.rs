//! Add command implementation

use anyhow::{Context, Result};
use mg_core::add_migration;

use crate::cli::{AddArgs, GlobalArgs};
use crate::commands::common::load_config;

/// Execute the add command
pub fn execute(args: &AddArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let created = add_migration(&config, &args.name).context("Failed to create migration")?;

    println!("Created {}", created.directory.display());
    println!("  {}", created.up_path().display());
    println!("  {}", created.down_path().display());
    println!("  {}", created.metadata_path().display());
    if created.metadata.parents.is_empty() {
        println!("  parents: none (root migration)");
    } else {
        let parents: Vec<String> = created.metadata.parents.iter().map(i64::to_string).collect();
        println!("  parents: {}", parents.join(", "));
    }
    Ok(())
}
