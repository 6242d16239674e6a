use std::path::Path;

use anyhow::Result;

use krait_runtime::ConfigStore;

/// Create a starter project settings file in `dir`.
pub fn run(store: &ConfigStore, dir: &Path) -> Result<()> {
    let path = store.init_project_config(dir)?;
    println!("Created project settings at {}", path.display());
    println!("Edit it to set a model, patterns, and hooks for this project");
    Ok(())
}
