//! View state controller
//!
//! Top-level state machine of a tracking session:
//!
//! ```text
//!   home ──submit/track/open_saved──▶ loading ──result──▶ dashboard
//!     ▲                                  │                    │
//!     └──────── submission failure ──────┘                    │
//!     └──────────────── return_home (any state) ◀─────────────┘
//! ```
//!
//! The controller owns the single active [`PollHandle`]. Starting a new
//! session or returning home drops it, which cancels the poller. Backend
//! failures never escape: they end up either as a failure panel on the
//! loading view or as a placeholder result on the dashboard.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use vidlens_client::{AnalysisApi, VideoUpload};
use vidlens_core::domain::job::AnalysisJob;
use vidlens_core::domain::result::AnalysisResult;

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::scheduler::{JobPoller, PollEvent, PollFailure, PollHandle, PollOutcome, Watchdog};
use crate::service::{ResultFetcher, attach_metadata, unwrap_payload};

/// Guidance shown when the video source demands a CAPTCHA
pub const CAPTCHA_GUIDANCE: &str = "The video source is asking for CAPTCHA verification, so the \
     video could not be downloaded. Download the video yourself and upload the file directly instead.";

const GENERIC_GUIDANCE: &str = "Return home and try again.";

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Loading,
    Dashboard,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViewKind::Home => "home",
            ViewKind::Loading => "loading",
            ViewKind::Dashboard => "dashboard",
        };
        write!(f, "{}", name)
    }
}

/// What the loading view is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingSource {
    /// A file being submitted under a display name
    Upload { name: String },
    /// An already-submitted job
    Job { job_id: String },
    /// A saved analysis being opened
    Saved { id: String },
}

/// Error panel shown on the loading view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingFailure {
    pub message: String,
    pub captcha: bool,
    pub guidance: String,
}

impl From<&PollFailure> for LoadingFailure {
    fn from(failure: &PollFailure) -> Self {
        let captcha = failure.is_captcha();
        Self {
            message: failure.message(),
            captcha,
            guidance: if captcha {
                CAPTCHA_GUIDANCE.to_string()
            } else {
                GENERIC_GUIDANCE.to_string()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadingView {
    pub source: LoadingSource,
    pub job: Option<AnalysisJob>,
    pub failure: Option<LoadingFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub job_id: Option<String>,
    pub result: AnalysisResult,
    /// Reached through the watchdog instead of a completed status
    pub recovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Home,
    Loading(LoadingView),
    Dashboard(DashboardView),
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewState::Home => ViewKind::Home,
            ViewState::Loading(_) => ViewKind::Loading,
            ViewState::Dashboard(_) => ViewKind::Dashboard,
        }
    }
}

/// Observer of controller activity
///
/// All methods default to doing nothing.
pub trait ViewListener: Send {
    fn on_transition(&mut self, _from: ViewKind, _to: ViewKind) {}

    fn on_progress(&mut self, _job: &AnalysisJob) {}

    fn on_failure(&mut self, _failure: &LoadingFailure) {}

    /// The watchdog fired; `found` tells whether the listing had the job
    fn on_recovery(&mut self, _job_id: &str, _found: bool) {}
}

/// Listener that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ViewListener for NoopListener {}

enum Tick {
    Event(Option<PollEvent>),
    WatchdogFired,
}

pub struct ViewStateController<L: ViewListener = NoopListener> {
    api: Arc<dyn AnalysisApi>,
    poller: JobPoller,
    fetcher: ResultFetcher,
    watchdog: Watchdog,
    state: ViewState,
    active: Option<PollHandle>,
    alert: Option<String>,
    listener: L,
}

impl ViewStateController<NoopListener> {
    pub fn new(api: Arc<dyn AnalysisApi>, config: &TrackerConfig) -> Self {
        Self::with_listener(api, config, NoopListener)
    }
}

impl<L: ViewListener> ViewStateController<L> {
    pub fn with_listener(api: Arc<dyn AnalysisApi>, config: &TrackerConfig, listener: L) -> Self {
        Self {
            poller: JobPoller::new(Arc::clone(&api), config.poller.clone()),
            fetcher: ResultFetcher::new(Arc::clone(&api), config.fetcher.clone()),
            watchdog: Watchdog::new(config.watchdog_interval),
            api,
            state: ViewState::Home,
            active: None,
            alert: None,
            listener,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn kind(&self) -> ViewKind {
        self.state.kind()
    }

    /// Alert left by a failed submission
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Id of the job this session is about, if any
    pub fn job_id(&self) -> Option<&str> {
        match &self.state {
            ViewState::Home => None,
            ViewState::Loading(view) => match (&view.job, &view.source) {
                (Some(job), _) => Some(job.id.as_str()),
                (None, LoadingSource::Job { job_id }) => Some(job_id.as_str()),
                (None, LoadingSource::Saved { id }) => Some(id.as_str()),
                (None, LoadingSource::Upload { .. }) => None,
            },
            ViewState::Dashboard(view) => view.job_id.as_deref(),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            ViewState::Dashboard(view) => Some(&view.result),
            _ => None,
        }
    }

    /// Whether a poller is currently running
    pub fn is_polling(&self) -> bool {
        self.active.is_some()
    }

    // =============================================================================
    // Transitions
    // =============================================================================

    /// Submits a new video and starts tracking it
    ///
    /// Any running session is cancelled first. Returns the backend job id.
    /// A missing job id in the backend's answer sends the controller back
    /// home with an alert.
    pub async fn submit(&mut self, upload: VideoUpload) -> Result<String> {
        if upload.name.trim().is_empty() {
            return Err(TrackerError::InvalidSubmission(
                "analysis name cannot be empty".to_string(),
            ));
        }
        if upload.content.is_empty() {
            return Err(TrackerError::InvalidSubmission(
                "video file cannot be empty".to_string(),
            ));
        }

        self.end_session();
        self.alert = None;
        self.transition(ViewState::Loading(LoadingView {
            source: LoadingSource::Upload {
                name: upload.name.clone(),
            },
            job: None,
            failure: None,
        }));

        info!(name = %upload.name, file = %upload.file_name, "Submitting video for analysis");

        let job_id = match self.api.submit_analysis(upload).await {
            Ok(response) => response.analysis_id.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                return Err(self.abort_submission(e.to_string()));
            }
        };

        let Some(job_id) = job_id else {
            return Err(self.abort_submission(
                "the server did not return an analysis id".to_string(),
            ));
        };

        self.begin_polling(job_id.clone())?;
        Ok(job_id)
    }

    /// Starts tracking a job that was submitted elsewhere
    pub fn track(&mut self, job_id: impl Into<String>) -> Result<()> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(TrackerError::InvalidSubmission(
                "job id cannot be empty".to_string(),
            ));
        }

        self.end_session();
        self.alert = None;
        self.transition(ViewState::Loading(LoadingView {
            source: LoadingSource::Job {
                job_id: job_id.clone(),
            },
            job: None,
            failure: None,
        }));

        self.begin_polling(job_id)
    }

    /// Opens a saved analysis; always ends on the dashboard
    pub async fn open_saved(&mut self, id: impl Into<String>) -> Result<&ViewState> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TrackerError::InvalidSubmission(
                "saved analysis id cannot be empty".to_string(),
            ));
        }

        self.end_session();
        self.alert = None;
        self.transition(ViewState::Loading(LoadingView {
            source: LoadingSource::Saved { id: id.clone() },
            job: None,
            failure: None,
        }));

        let saved = self.fetcher.fetch_saved(&id).await;
        self.transition(ViewState::Dashboard(DashboardView {
            job_id: Some(id),
            result: saved.result,
            recovered: false,
        }));

        Ok(&self.state)
    }

    /// Drives the loading session until it settles
    ///
    /// Returns when the dashboard is reached, or when polling failed and the
    /// loading view shows a failure panel. Returns at once when there is no
    /// running session.
    pub async fn run(&mut self) -> &ViewState {
        loop {
            let tick = {
                let Some(handle) = self.active.as_mut() else {
                    break;
                };
                let watchdog = &self.watchdog;
                tokio::select! {
                    event = handle.next_event() => Tick::Event(event),
                    _ = watchdog.expired() => Tick::WatchdogFired,
                }
            };

            match tick {
                Tick::Event(Some(PollEvent::Progress(job))) => {
                    let was_armed = self.watchdog.is_armed();
                    self.watchdog.observe(job.progress);
                    if !was_armed && self.watchdog.is_armed() {
                        debug!(job_id = %job.id, "Progress reached 100%, watchdog armed");
                    }
                    self.listener.on_progress(&job);
                    if let ViewState::Loading(view) = &mut self.state {
                        view.job = Some(job);
                    }
                }
                Tick::Event(Some(PollEvent::Finished(PollOutcome::Completed(job)))) => {
                    self.end_session();
                    self.listener.on_progress(&job);
                    self.show_result(job).await;
                }
                Tick::Event(Some(PollEvent::Finished(PollOutcome::Failed { job, failure }))) => {
                    self.end_session();
                    self.show_failure(Some(job), &failure);
                }
                Tick::Event(None) => {
                    self.end_session();
                    let failure = PollFailure::Rejected {
                        message: "Status polling stopped unexpectedly".to_string(),
                    };
                    self.show_failure(None, &failure);
                }
                Tick::WatchdogFired => {
                    self.end_session();
                    self.recover_stuck_job().await;
                }
            }
        }

        &self.state
    }

    /// Goes back home from any state, dropping the job, result and poller
    pub fn return_home(&mut self) {
        self.end_session();
        self.alert = None;
        self.transition(ViewState::Home);
    }

    // =============================================================================
    // Internals
    // =============================================================================

    fn begin_polling(&mut self, job_id: String) -> Result<()> {
        let handle = self.poller.start(job_id.clone())?;
        self.active = Some(handle);

        if let ViewState::Loading(view) = &mut self.state {
            view.job = Some(AnalysisJob::new(job_id));
        }
        Ok(())
    }

    /// Cancels the running poller, if any
    fn end_session(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
        self.watchdog.disarm();
    }

    fn abort_submission(&mut self, reason: String) -> TrackerError {
        let err = TrackerError::SubmissionFailed(reason);
        warn!("{}", err);
        self.alert = Some(err.to_string());
        self.transition(ViewState::Home);
        err
    }

    async fn show_result(&mut self, job: AnalysisJob) {
        let result = self
            .fetcher
            .fetch(job.result_key(), job.metadata.clone())
            .await;

        self.transition(ViewState::Dashboard(DashboardView {
            job_id: Some(job.id),
            result,
            recovered: false,
        }));
    }

    fn show_failure(&mut self, job: Option<AnalysisJob>, failure: &PollFailure) {
        let failure = LoadingFailure::from(failure);
        self.listener.on_failure(&failure);

        if let ViewState::Loading(view) = &mut self.state {
            if job.is_some() {
                view.job = job;
            }
            view.failure = Some(failure);
        }
    }

    /// Progress sat at 100% without a completed status
    ///
    /// Looks the job up in the completed listing. Whatever happens, the
    /// dashboard is shown afterwards.
    async fn recover_stuck_job(&mut self) {
        let (job_id, metadata) = match &self.state {
            ViewState::Loading(LoadingView { job: Some(job), .. }) => {
                (job.id.clone(), job.metadata.clone())
            }
            _ => return,
        };

        warn!(job_id = %job_id, "Progress stuck at 100%, checking completed analyses");

        let recovered = match self.api.list_analyses().await {
            Ok(listing) => listing
                .find(&job_id)
                .map(|entry| (entry.analysis_data.clone(), entry.metadata.clone())),
            Err(e) => {
                warn!(job_id = %job_id, "Failed to list completed analyses: {}", e);
                None
            }
        };

        self.listener.on_recovery(&job_id, recovered.is_some());

        let result = match recovered {
            Some((data, entry_metadata)) => {
                info!(job_id = %job_id, "Recovered analysis from completed listing");
                let metadata = merge_metadata(entry_metadata, metadata);
                AnalysisResult::new(attach_metadata(unwrap_payload(data), metadata))
            }
            None => {
                debug!(job_id = %job_id, "No completed record found");
                AnalysisResult::placeholder(
                    job_id.clone(),
                    "The analysis reported full progress but its result could not be found",
                    metadata,
                )
            }
        };

        self.transition(ViewState::Dashboard(DashboardView {
            job_id: Some(job_id),
            result,
            recovered: true,
        }));
    }

    fn transition(&mut self, next: ViewState) {
        let from = self.state.kind();
        let to = next.kind();
        self.state = next;

        if from != to {
            debug!(%from, %to, "View transition");
            self.listener.on_transition(from, to);
        }
    }
}

/// Listing metadata wins; job metadata fills the gaps
fn merge_metadata(primary: JsonValue, fallback: Option<JsonValue>) -> Option<JsonValue> {
    match (primary, fallback) {
        (JsonValue::Object(mut primary), Some(JsonValue::Object(fallback))) => {
            for (key, value) in fallback {
                primary.entry(key).or_insert(value);
            }
            Some(JsonValue::Object(primary))
        }
        (JsonValue::Null, fallback) => fallback,
        (primary, _) => Some(primary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedApi, progress};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time;
    use vidlens_client::ClientError;
    use vidlens_core::dto::analysis::{AnalysesListing, SubmitResponse};
    use vidlens_core::dto::saved::SavedAnalysisRecord;

    #[derive(Default)]
    struct Recorder {
        transitions: Vec<(ViewKind, ViewKind)>,
        progress: Vec<(String, u8)>,
        failures: Vec<LoadingFailure>,
        recoveries: Vec<(String, bool)>,
    }

    impl ViewListener for Recorder {
        fn on_transition(&mut self, from: ViewKind, to: ViewKind) {
            self.transitions.push((from, to));
        }

        fn on_progress(&mut self, job: &AnalysisJob) {
            self.progress.push((job.id.clone(), job.progress));
        }

        fn on_failure(&mut self, failure: &LoadingFailure) {
            self.failures.push(failure.clone());
        }

        fn on_recovery(&mut self, job_id: &str, found: bool) {
            self.recoveries.push((job_id.to_string(), found));
        }
    }

    fn controller(api: &Arc<ScriptedApi>) -> ViewStateController<Recorder> {
        ViewStateController::with_listener(api.clone(), &TrackerConfig::default(), Recorder::default())
    }

    fn upload() -> VideoUpload {
        VideoUpload::new("Launch teaser", "teaser.mp4", b"video".to_vec())
    }

    fn submitted(id: &str) -> std::result::Result<SubmitResponse, ClientError> {
        Ok(SubmitResponse {
            analysis_id: Some(id.to_string()),
        })
    }

    fn completed(result_id: &str) -> vidlens_core::dto::analysis::ProgressResponse {
        let mut report = progress("completed", 100.0);
        report.result_id = Some(result_id.to_string());
        report
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_reaches_dashboard() {
        let api = Arc::new(ScriptedApi::new());
        api.set_submit(submitted("abc123"));
        api.push_progress(Ok(progress("initializing", 0.0)));
        api.push_progress(Ok(progress("running_gemini_analysis", 45.0)));
        api.push_progress(Ok(completed("abc123")));
        api.push_analysis(Ok(json!({
            "analysis_data": { "metadata": { "id": "abc123" }, "summary": { "overview": "Strong open" } }
        })));

        let mut controller = controller(&api);
        assert_eq!(controller.kind(), ViewKind::Home);

        let job_id = controller.submit(upload()).await.unwrap();
        assert_eq!(job_id, "abc123");
        assert_eq!(controller.kind(), ViewKind::Loading);

        let state = controller.run().await;
        match state {
            ViewState::Dashboard(view) => {
                assert_eq!(view.job_id.as_deref(), Some("abc123"));
                assert!(!view.recovered);
                assert!(!view.result.is_placeholder());
                assert_eq!(view.result.as_json()["summary"]["overview"], "Strong open");
            }
            other => panic!("unexpected state {:?}", other),
        }

        assert_eq!(api.submitted(), vec!["Launch teaser"]);
        assert_eq!(api.analysis_ids(), vec!["abc123"]);
        let recorder = controller.listener();
        assert_eq!(
            recorder.transitions,
            vec![
                (ViewKind::Home, ViewKind::Loading),
                (ViewKind::Loading, ViewKind::Dashboard)
            ]
        );
        let seen: Vec<u8> = recorder.progress.iter().map(|(_, p)| *p).collect();
        assert_eq!(seen, vec![0, 45, 100]);
        assert!(!controller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_progress_is_retried() {
        let api = Arc::new(ScriptedApi::new());
        for _ in 0..3 {
            api.push_progress(Err(ClientError::api_error(404, "unknown analysis")));
        }
        api.push_progress(Ok(completed("abc123")));
        api.push_analysis(Ok(json!({ "summary": { "overview": "done" } })));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();
        let state = controller.run().await;

        assert_eq!(state.kind(), ViewKind::Dashboard);
        assert_eq!(api.progress_calls(), 4);

        let gaps: Vec<u128> = api
            .progress_gaps()
            .into_iter()
            .map(|gap| gap.as_millis())
            .collect();
        assert_eq!(gaps, vec![3000, 4500, 6750]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_captcha_failure_shows_guidance_and_stops_polling() {
        let api = Arc::new(ScriptedApi::new());
        let mut report = progress("error", 10.0);
        report.message = Some("YouTube CAPTCHA required".to_string());
        api.push_progress(Ok(report));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();
        let state = controller.run().await.clone();

        match state {
            ViewState::Loading(view) => {
                let failure = view.failure.expect("failure panel");
                assert!(failure.captcha);
                assert_eq!(failure.message, "YouTube CAPTCHA required");
                assert_eq!(failure.guidance, CAPTCHA_GUIDANCE);
                assert_eq!(view.job.unwrap().id, "abc123");
            }
            other => panic!("unexpected state {:?}", other),
        }

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.progress_calls(), 1);
        assert_eq!(controller.listener().failures.len(), 1);

        controller.return_home();
        assert_eq!(controller.kind(), ViewKind::Home);
        assert!(controller.job_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_captcha_phase_shows_guidance() {
        let api = Arc::new(ScriptedApi::new());
        let mut report = progress("captcha_error", 5.0);
        report.message = Some("Download blocked by the video host".to_string());
        api.push_progress(Ok(report));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();

        match controller.run().await {
            ViewState::Loading(view) => {
                let failure = view.failure.as_ref().expect("failure panel");
                assert!(failure.captcha);
                assert_eq!(failure.message, "Download blocked by the video host");
                assert_eq!(failure.guidance, CAPTCHA_GUIDANCE);
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert!(!controller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_service_shows_failure_panel() {
        let api = Arc::new(ScriptedApi::new());
        for _ in 0..10 {
            api.push_progress(Err(ClientError::api_error(503, "unavailable")));
        }

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();

        match controller.run().await {
            ViewState::Loading(view) => {
                let failure = view.failure.as_ref().unwrap();
                assert!(!failure.captcha);
                assert!(failure.message.contains("Cannot reach the analysis service"));
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(controller.listener().failures.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_recovers_from_listing() {
        let api = Arc::new(ScriptedApi::new());
        api.push_progress(Ok(progress("finalizing_results", 100.0)));
        api.set_listing(Ok(serde_json::from_value::<AnalysesListing>(json!({
            "analyses": [
                { "metadata": { "id": "other" }, "analysis_data": {} },
                { "metadata": { "id": "abc123" }, "analysis_data": { "summary": { "overview": "recovered" } } }
            ]
        }))
        .unwrap()));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();
        let start = time::Instant::now();

        match controller.run().await {
            ViewState::Dashboard(view) => {
                assert!(view.recovered);
                assert!(!view.result.is_placeholder());
                assert_eq!(view.result.as_json()["summary"]["overview"], "recovered");
                assert_eq!(view.result.id(), Some("abc123"));
            }
            other => panic!("unexpected state {:?}", other),
        }

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(6));
        assert_eq!(api.listing_calls(), 1);
        assert_eq!(
            controller.listener().recoveries,
            vec![("abc123".to_string(), true)]
        );

        let calls = api.progress_calls();
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.progress_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_degrades_to_placeholder() {
        let api = Arc::new(ScriptedApi::new());
        api.push_progress(Ok(progress("validating_analysis", 100.0)));
        api.set_listing(Err(ClientError::api_error(500, "listing down")));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();

        match controller.run().await {
            ViewState::Dashboard(view) => {
                assert!(view.recovered);
                assert!(view.result.is_placeholder());
                assert_eq!(view.result.id(), Some("abc123"));
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(
            controller.listener().recoveries,
            vec![("abc123".to_string(), false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_job_id_returns_home_with_alert() {
        let api = Arc::new(ScriptedApi::new());
        api.set_submit(Ok(SubmitResponse { analysis_id: None }));

        let mut controller = controller(&api);
        let err = controller.submit(upload()).await.unwrap_err();

        assert!(matches!(err, TrackerError::SubmissionFailed(_)));
        assert_eq!(controller.kind(), ViewKind::Home);
        assert!(controller.alert().unwrap().contains("analysis id"));
        assert_eq!(api.progress_calls(), 0);
        assert_eq!(
            controller.listener().transitions,
            vec![
                (ViewKind::Home, ViewKind::Loading),
                (ViewKind::Loading, ViewKind::Home)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_request_failure_returns_home() {
        let api = Arc::new(ScriptedApi::new());
        api.set_submit(Err(ClientError::api_error(413, "file too large")));

        let mut controller = controller(&api);
        assert!(controller.submit(upload()).await.is_err());
        assert_eq!(controller.kind(), ViewKind::Home);
        assert!(controller.alert().unwrap().contains("file too large"));
    }

    #[tokio::test]
    async fn test_invalid_submission_stays_home() {
        let api = Arc::new(ScriptedApi::new());
        let mut controller = controller(&api);

        let err = controller
            .submit(VideoUpload::new("", "teaser.mp4", b"video".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidSubmission(_)));

        let err = controller
            .submit(VideoUpload::new("Teaser", "teaser.mp4", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidSubmission(_)));

        assert_eq!(controller.kind(), ViewKind::Home);
        assert!(api.submitted().is_empty());
        assert!(controller.listener().transitions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_cancels_previous_poller() {
        let api = Arc::new(ScriptedApi::new());
        api.set_progress_latency(Duration::from_secs(1));
        api.push_progress(Ok(completed("second")));
        api.push_analysis(Ok(json!({ "summary": { "overview": "second" } })));

        let mut controller = controller(&api);
        controller.track("first").unwrap();
        time::sleep(Duration::from_millis(100)).await;

        controller.track("second").unwrap();
        controller.run().await;

        assert_eq!(api.progress_ids(), vec!["first", "second"]);
        assert_eq!(api.progress_answered(), 1);
        assert_eq!(controller.job_id(), Some("second"));
        assert!(
            controller
                .listener()
                .progress
                .iter()
                .all(|(id, _)| id == "second")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_return_home_while_loading_stops_updates() {
        let api = Arc::new(ScriptedApi::new());
        api.push_progress(Ok(progress("downloading_video", 10.0)));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(api.progress_calls(), 1);

        controller.return_home();
        assert!(!controller.is_polling());

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.progress_calls(), 1);
        assert_eq!(controller.run().await, &ViewState::Home);
        assert!(controller.listener().progress.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dashboard_back_to_home_clears_session() {
        let api = Arc::new(ScriptedApi::new());
        api.push_progress(Ok(completed("abc123")));

        let mut controller = controller(&api);
        controller.track("abc123").unwrap();

        // No result was scripted: the fetcher exhausts its retries
        match controller.run().await {
            ViewState::Dashboard(view) => assert!(view.result.is_placeholder()),
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(api.analysis_ids().len(), 5);
        assert!(controller.result().is_some());

        controller.return_home();
        assert_eq!(controller.kind(), ViewKind::Home);
        assert!(controller.result().is_none());
        assert!(controller.job_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_saved_analysis() {
        let api = Arc::new(ScriptedApi::new());
        api.push_saved(Ok(serde_json::from_value::<SavedAnalysisRecord>(json!({
            "id": "s1",
            "name": "Teaser",
            "analysis_data": { "emotional_analysis": { "dominant": "joy" } }
        }))
        .unwrap()));

        let mut controller = controller(&api);
        let state = controller.open_saved("s1").await.unwrap();

        match state {
            ViewState::Dashboard(view) => {
                assert_eq!(view.job_id.as_deref(), Some("s1"));
                assert_eq!(
                    view.result.as_json()["emotional_analysis"]["dominant"],
                    "joy"
                );
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(
            controller.listener().transitions,
            vec![
                (ViewKind::Home, ViewKind::Loading),
                (ViewKind::Loading, ViewKind::Dashboard)
            ]
        );
    }

    #[test]
    fn test_merge_metadata() {
        let merged = merge_metadata(
            json!({ "id": "abc123", "title": "listing" }),
            Some(json!({ "title": "job", "duration": 30 })),
        )
        .unwrap();
        assert_eq!(merged, json!({ "id": "abc123", "title": "listing", "duration": 30 }));

        assert_eq!(
            merge_metadata(JsonValue::Null, Some(json!({ "a": 1 }))),
            Some(json!({ "a": 1 }))
        );
    }
}
