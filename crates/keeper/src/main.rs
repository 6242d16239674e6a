mod cli;
mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, ConfigCommands, HooksCommands};
use krait_runtime::ConfigStore;

fn resolve_dir(dir: Option<String>) -> Result<PathBuf> {
    match dir {
        Some(raw) => Ok(PathBuf::from(shellexpand::tilde(&raw).into_owned())),
        None => std::env::current_dir().context("Failed to resolve current directory"),
    }
}

fn main() -> Result<()> {
    krait_runtime::init_logging();

    let cli = Cli::parse();
    let dir = resolve_dir(cli.dir)?;
    let store = Arc::new(ConfigStore::from_env(&dir)?);

    match cli.command {
        Commands::Init => commands::init::run(&store, &dir),
        Commands::Hooks { action } => match action {
            HooksCommands::List { merged } => commands::hooks::run_list(store, !merged),
            HooksCommands::Init { local } => commands::hooks::run_init(&store, local),
            HooksCommands::Example => commands::hooks::run_example(),
        },
        Commands::Config { action } => match action {
            ConfigCommands::Show => commands::show_config::run(&store),
        },
    }
}
