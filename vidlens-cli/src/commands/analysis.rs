//! Analysis command handlers
//!
//! `analyze` and `track` drive a [`ViewStateController`] until it settles on
//! the dashboard or on a failure panel. `show` fetches a finished report
//! directly.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use colored::*;
use vidlens_client::{AnalysisApi, VideoUpload};
use vidlens_tracker::{ResultFetcher, ViewState, ViewStateController};

use crate::config::Config;
use crate::render::{self, ProgressListener};

type Controller = ViewStateController<ProgressListener>;

/// Upload a video and follow it to the report
pub async fn analyze(config: &Config, file: &Path, name: Option<String>) -> Result<()> {
    let name = name.unwrap_or_else(|| default_name(file));
    let upload = VideoUpload::from_path(name, file)
        .await
        .with_context(|| format!("Failed to read video file {}", file.display()))?;

    let mut controller = controller(config)?;

    if !config.json {
        println!(
            "{} {} ({})",
            "Uploading".bold(),
            upload.name.cyan(),
            format_size(upload.content.len()).dimmed()
        );
    }

    let job_id = controller.submit(upload).await?;

    if !config.json {
        println!("{} {}", "Analysis started:".green(), job_id.cyan());
        println!(
            "{}",
            format!("  Resume later with: vidlens track {}", job_id).dimmed()
        );
    }

    follow(&mut controller, config).await
}

/// Follow an already submitted analysis
pub async fn track(config: &Config, id: &str) -> Result<()> {
    let mut controller = controller(config)?;
    controller.track(id)?;

    if !config.json {
        println!("{} {}", "Tracking analysis".bold(), id.cyan());
    }

    follow(&mut controller, config).await
}

/// Fetch and render a finished analysis
pub async fn show(config: &Config, id: &str) -> Result<()> {
    let api: Arc<dyn AnalysisApi> = Arc::new(config.client()?);
    let fetcher = ResultFetcher::new(api, config.tracker.fetcher.clone());

    let result = fetcher.fetch(id, None).await;
    render::print_result(&result, Some(id), false, config.json)?;

    if result.is_placeholder() {
        bail!("Analysis {} could not be loaded", id);
    }
    Ok(())
}

fn controller(config: &Config) -> Result<Controller> {
    let api: Arc<dyn AnalysisApi> = Arc::new(config.client()?);
    Ok(ViewStateController::with_listener(
        api,
        &config.tracker,
        ProgressListener::new(config.json),
    ))
}

/// Runs the loading session and renders wherever it settles
async fn follow(controller: &mut Controller, config: &Config) -> Result<()> {
    let interrupted = tokio::select! {
        _ = controller.run() => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        let job_id = controller.job_id().map(str::to_string);
        controller.return_home();
        match job_id {
            Some(id) => bail!("Interrupted; resume with `vidlens track {}`", id),
            None => bail!("Interrupted"),
        }
    }

    settle(controller.state(), controller.alert(), config.json)
}

/// Renders the settled state; only a real report counts as success
fn settle(state: &ViewState, alert: Option<&str>, json: bool) -> Result<()> {
    match state {
        ViewState::Dashboard(view) => {
            render::print_result(&view.result, view.job_id.as_deref(), view.recovered, json)?;
            if view.result.is_placeholder() {
                bail!(
                    "Analysis {} could not be loaded",
                    view.job_id.as_deref().unwrap_or("unknown")
                );
            }
            Ok(())
        }
        ViewState::Loading(view) => {
            let Some(failure) = &view.failure else {
                bail!("Analysis stopped before completing");
            };
            if !json {
                render::print_failure(failure);
            }
            bail!("{}", failure.message)
        }
        ViewState::Home => match alert {
            Some(alert) => bail!("{}", alert),
            None => bail!("Analysis was abandoned"),
        },
    }
}

/// Analysis name derived from the video file name
fn default_name(file: &Path) -> String {
    file.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Untitled video")
        .to_string()
}

fn format_size(bytes: usize) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MB {
        format!("{:.1} MB", bytes as f64 / MB)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
