//! Live progress output

use colored::*;
use vidlens_core::domain::job::AnalysisJob;
use vidlens_tracker::{LoadingFailure, ViewKind, ViewListener};

const BAR_WIDTH: usize = 24;

/// Prints one line per progress change
///
/// Repeated identical reports are skipped, which keeps the output short
/// while the backend sits in one phase. Silent in JSON mode.
#[derive(Debug, Default)]
pub struct ProgressListener {
    quiet: bool,
    last: Option<(u8, String)>,
}

impl ProgressListener {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, last: None }
    }
}

impl ViewListener for ProgressListener {
    fn on_transition(&mut self, from: ViewKind, to: ViewKind) {
        tracing::debug!(%from, %to, "Screen changed");
        if to == ViewKind::Loading {
            self.last = None;
        }
    }

    fn on_progress(&mut self, job: &AnalysisJob) {
        let line = job.status_line();
        let current = (job.progress, line);
        if self.last.as_ref() == Some(&current) {
            return;
        }

        if !self.quiet {
            println!("  {} {}", progress_bar(current.0), current.1);
        }
        self.last = Some(current);
    }

    fn on_failure(&mut self, failure: &LoadingFailure) {
        tracing::debug!(captcha = failure.captcha, "Loading failed: {}", failure.message);
    }

    fn on_recovery(&mut self, job_id: &str, found: bool) {
        if self.quiet {
            return;
        }
        let note = if found {
            format!("Progress stalled at 100%; recovered {} from completed analyses", job_id)
        } else {
            format!("Progress stalled at 100%; no completed record for {}", job_id)
        };
        println!("  {}", note.yellow());
    }
}

fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100) as usize;
    let filled = progress * BAR_WIDTH / 100;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled).green(),
        "░".repeat(BAR_WIDTH - filled).dimmed(),
        progress
    )
}
