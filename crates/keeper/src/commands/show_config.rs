use anyhow::{Context, Result};

use krait_runtime::ConfigStore;

/// Print where settings come from and what the merge resolved to.
pub fn run(store: &ConfigStore) -> Result<()> {
    println!("Global settings: ~/.krait/settings.json");
    match store.project_config_path() {
        Some(path) => println!("Project settings: {}", path.display()),
        None => println!("Project settings: (none)"),
    }
    println!();

    let merged = store.settings();
    let json = serde_json::to_string_pretty(&merged).context("Failed to encode settings")?;
    println!("Merged configuration (active):");
    println!("{json}");
    Ok(())
}
