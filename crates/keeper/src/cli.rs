use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "keeper")]
#[command(about = "Krait - hook and settings management", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory to operate on (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a project settings file
    Init,
    /// Manage lifecycle hooks
    Hooks {
        #[command(subcommand)]
        action: HooksCommands,
    },
    /// Inspect effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum HooksCommands {
    /// List configured hooks by scope
    List {
        /// Show only the merged (active) configuration
        #[arg(long)]
        merged: bool,
    },
    /// Write a starter hooks configuration
    Init {
        /// Write to the project-local file instead of the global one
        #[arg(long)]
        local: bool,
    },
    /// Print an example hooks configuration
    Example,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged settings and their sources
    Show,
}
