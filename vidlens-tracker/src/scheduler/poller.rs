//! Job poller
//!
//! Polls the analysis backend for the status of one job until it reaches a
//! terminal phase. Each poller runs as its own task and reports through a
//! [`PollHandle`]: zero or more progress events followed by exactly one
//! terminal event. Cancelling or dropping the handle stops the task, aborts
//! the in-flight request and guarantees no further events are observed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vidlens_client::AnalysisApi;
use vidlens_core::domain::job::{AnalysisJob, AnalysisPhase};

use crate::backoff::Backoff;
use crate::config::PollerConfig;
use crate::error::{Result, TrackerError};

const EVENT_BUFFER: usize = 16;

/// Why polling ended without completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The backend reported the job as failed
    Service { message: String, captcha: bool },
    /// Too many consecutive polls failed
    Unreachable { attempts: u32, last_error: String },
    /// The backend refused the status request outright
    Rejected { message: String },
}

impl PollFailure {
    pub fn message(&self) -> String {
        match self {
            PollFailure::Service { message, .. } => message.clone(),
            PollFailure::Unreachable { attempts, last_error } => format!(
                "Cannot reach the analysis service after {} attempts: {}",
                attempts, last_error
            ),
            PollFailure::Rejected { message } => message.clone(),
        }
    }

    pub fn is_captcha(&self) -> bool {
        matches!(self, PollFailure::Service { captcha: true, .. })
    }
}

/// Terminal result of polling a job
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(AnalysisJob),
    Failed {
        job: AnalysisJob,
        failure: PollFailure,
    },
}

/// Event delivered by a running poller
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A non-terminal status report
    Progress(AnalysisJob),
    /// The single terminal event; nothing follows it
    Finished(PollOutcome),
}

/// Spawns status pollers for analysis jobs
#[derive(Clone)]
pub struct JobPoller {
    api: Arc<dyn AnalysisApi>,
    config: PollerConfig,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(api: Arc<dyn AnalysisApi>, config: PollerConfig) -> Self {
        Self { api, config }
    }

    /// Starts polling `job_id` in a background task
    ///
    /// The first status request is issued immediately.
    pub fn start(&self, job_id: impl Into<String>) -> Result<PollHandle> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(TrackerError::InvalidSubmission(
                "job id cannot be empty".to_string(),
            ));
        }

        info!(
            job_id = %job_id,
            "Starting job poller (interval: {:?})",
            self.config.base_delay
        );

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let task = tokio::spawn(poll_job(
            Arc::clone(&self.api),
            self.config.clone(),
            AnalysisJob::new(job_id.clone()),
            cancel.clone(),
            tx,
        ));

        Ok(PollHandle {
            job_id,
            cancel,
            events: rx,
            task,
            finished: false,
        })
    }
}

/// Owner of one running poller
///
/// There is no way to observe events after [`PollHandle::cancel`]: it
/// consumes the handle. Dropping the handle cancels as well.
pub struct PollHandle {
    job_id: String,
    cancel: CancellationToken,
    events: mpsc::Receiver<PollEvent>,
    task: JoinHandle<()>,
    finished: bool,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Waits for the next event
    ///
    /// Returns `None` once the terminal event has been delivered, or if the
    /// poll task died without producing one.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        if self.finished {
            return None;
        }

        let event = self.events.recv().await;
        if matches!(event, None | Some(PollEvent::Finished(_))) {
            self.finished = true;
        }
        event
    }

    /// Skips progress events and returns the terminal outcome
    pub async fn outcome(mut self) -> Option<PollOutcome> {
        while let Some(event) = self.next_event().await {
            if let PollEvent::Finished(outcome) = event {
                return Some(outcome);
            }
        }
        None
    }

    /// Stops polling
    pub fn cancel(self) {
        debug!(job_id = %self.job_id, "Cancelling job poller");
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Poll loop for a single job
///
/// Exactly one request is in flight at a time; the next one is scheduled
/// only after the previous resolved, so reports apply in order.
async fn poll_job(
    api: Arc<dyn AnalysisApi>,
    config: PollerConfig,
    mut job: AnalysisJob,
    cancel: CancellationToken,
    events: mpsc::Sender<PollEvent>,
) {
    let mut backoff = Backoff::from(&config);

    loop {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            fetched = api.get_progress(&job.id) => fetched,
        };

        let delay = match fetched {
            Ok(report) => {
                backoff.reset();
                job.apply(report);
                debug!(
                    job_id = %job.id,
                    phase = %job.phase,
                    progress = job.progress,
                    "Received job status"
                );

                let phase = job.phase;
                match phase {
                    AnalysisPhase::Completed => {
                        info!(job_id = %job.id, "Analysis job completed");
                        emit(&cancel, &events, PollEvent::Finished(PollOutcome::Completed(job)))
                            .await;
                        return;
                    }
                    _ if phase.is_failure() => {
                        let failure = service_failure(&job);
                        warn!(job_id = %job.id, "Analysis job failed: {}", failure.message());
                        emit(
                            &cancel,
                            &events,
                            PollEvent::Finished(PollOutcome::Failed { job, failure }),
                        )
                        .await;
                        return;
                    }
                    _ => {
                        if !emit(&cancel, &events, PollEvent::Progress(job.clone())).await {
                            return;
                        }
                    }
                }

                backoff.current()
            }
            Err(e) if e.is_retryable() => {
                let delay = backoff.record_failure();
                let attempts = backoff.failures();

                if attempts >= config.max_consecutive_errors {
                    warn!(
                        job_id = %job.id,
                        attempts,
                        "Giving up on job status: {}",
                        e
                    );
                    let failure = PollFailure::Unreachable {
                        attempts,
                        last_error: e.to_string(),
                    };
                    emit(
                        &cancel,
                        &events,
                        PollEvent::Finished(PollOutcome::Failed { job, failure }),
                    )
                    .await;
                    return;
                }

                warn!(
                    job_id = %job.id,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Status poll failed, backing off: {}",
                    e
                );
                delay
            }
            Err(e) => {
                warn!(job_id = %job.id, "Status poll rejected: {}", e);
                let failure = PollFailure::Rejected {
                    message: e.to_string(),
                };
                emit(
                    &cancel,
                    &events,
                    PollEvent::Finished(PollOutcome::Failed { job, failure }),
                )
                .await;
                return;
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = time::sleep(delay) => {}
        }
    }
}

/// Sends an event unless the poller was cancelled; false when nobody listens
async fn emit(
    cancel: &CancellationToken,
    events: &mpsc::Sender<PollEvent>,
    event: PollEvent,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = events.send(event) => sent.is_ok(),
    }
}

fn service_failure(job: &AnalysisJob) -> PollFailure {
    let message = job
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| job.phase.describe().to_string());

    let captcha =
        job.phase == AnalysisPhase::CaptchaError || message.to_lowercase().contains("captcha");

    PollFailure::Service { message, captcha }
}
