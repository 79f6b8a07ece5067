//! Saved analysis command handlers

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use vidlens_client::{AnalysisApi, AnalysisClient};
use vidlens_core::domain::saved::SavedAnalysisSummary;
use vidlens_core::dto::saved::SavedAnalysisQuery;
use vidlens_tracker::{NoopListener, ViewState, ViewStateController};

use crate::config::Config;
use crate::render;

/// Saved analysis subcommands
#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved analyses
    List {
        /// Maximum number of entries
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Entries to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,
    },
    /// Open a saved analysis
    Get {
        /// Saved analysis ID
        id: String,
    },
    /// Delete a saved analysis
    Delete {
        /// Saved analysis ID
        id: String,
    },
}

/// Handle saved analysis commands
pub async fn handle_saved_command(command: SavedCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        SavedCommands::List { limit, skip } => list_saved(&client, limit, skip, config.json).await,
        SavedCommands::Get { id } => open_saved(client, &id, config).await,
        SavedCommands::Delete { id } => delete_saved(&client, &id).await,
    }
}

async fn list_saved(client: &AnalysisClient, limit: u32, skip: u32, json: bool) -> Result<()> {
    let page = client
        .list_saved_analyses(SavedAnalysisQuery { limit, skip })
        .await
        .context("Failed to list saved analyses")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page.analyses)?);
        return Ok(());
    }

    if page.analyses.is_empty() {
        println!("{}", "No saved analyses found.".yellow());
        return Ok(());
    }

    let heading = match page.total {
        Some(total) => format!(
            "Showing {} of {} saved analyses:",
            page.analyses.len(),
            total
        ),
        None => format!("Found {} saved analyses:", page.analyses.len()),
    };
    println!("{}", heading.bold());
    println!();
    for summary in &page.analyses {
        print_summary(summary);
    }

    Ok(())
}

/// Opens the saved analysis through the controller, like the dashboard does
async fn open_saved(client: AnalysisClient, id: &str, config: &Config) -> Result<()> {
    let api: Arc<dyn AnalysisApi> = Arc::new(client);
    let mut controller = ViewStateController::with_listener(api, &config.tracker, NoopListener);

    let state = controller.open_saved(id).await?;
    let ViewState::Dashboard(view) = state else {
        bail!("Saved analysis {} could not be opened", id);
    };

    render::print_result(&view.result, Some(id), false, config.json)?;
    if view.result.is_placeholder() {
        bail!("Saved analysis {} could not be loaded", id);
    }
    Ok(())
}

async fn delete_saved(client: &AnalysisClient, id: &str) -> Result<()> {
    client
        .delete_saved_analysis(id)
        .await
        .with_context(|| format!("Failed to delete saved analysis {}", id))?;

    println!("{} {}", "✓ Deleted saved analysis".green(), id.cyan());
    Ok(())
}

fn print_summary(summary: &SavedAnalysisSummary) {
    println!("  {} {}", "▸".cyan(), summary.title().bold());
    println!("    ID:      {}", summary.id.dimmed());
    if let Some(status) = &summary.status {
        println!("    Status:  {}", status);
    }
    if let Some(created) = summary.created_at {
        println!(
            "    Created: {}",
            created
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
    }
    println!();
}
