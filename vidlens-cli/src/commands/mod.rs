//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod analysis;
mod saved;

pub use saved::SavedCommands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a video and follow its analysis to the finished report
    Analyze {
        /// Video file to upload
        file: PathBuf,

        /// Name of the analysis (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Follow an analysis that was already submitted
    Track {
        /// Analysis ID
        id: String,
    },
    /// Show the report of a finished analysis
    Show {
        /// Analysis or result ID
        id: String,
    },
    /// Saved analysis management
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Analyze { file, name } => analysis::analyze(config, &file, name).await,
        Commands::Track { id } => analysis::track(config, &id).await,
        Commands::Show { id } => analysis::show(config, &id).await,
        Commands::Saved { command } => saved::handle_saved_command(command, config).await,
    }
}
