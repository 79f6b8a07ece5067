//! Vidlens CLI
//!
//! Command-line front-end for the video analysis service: submits videos,
//! follows their progress and renders the finished reports.

mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vidlens")]
#[command(about = "Video analysis tracker", long_about = None)]
struct Cli {
    /// Analysis service URL (defaults to the VIDLENS_ENV backend)
    #[arg(long, env = "VIDLENS_API_URL", global = true)]
    api_url: Option<String>,

    /// Print results as JSON instead of a formatted report
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays parseable
    let default_filter = if cli.verbose {
        "vidlens=debug"
    } else {
        "vidlens=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.api_url, cli.json)?;
    tracing::debug!(api_url = %config.tracker.api_base_url, "Loaded configuration");

    handle_command(cli.command, &config).await
}
