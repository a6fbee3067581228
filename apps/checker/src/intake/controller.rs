use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_ANALYSIS_DELAY};
use crate::errors::IntakeError;
use crate::gate::{JsonFileStore, LocalClock, ScanGate};
use crate::intake::analyzer::{Analyzer, StaticAnalyzer};
use crate::intake::delay::{AnalysisDelay, FixedDelay};
use crate::intake::surface::{Notifier, ResultDisplay};
use crate::models::upload::first_pdf;
use crate::models::{AnalysisResult, UploadedFile};

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

/// Where the most recent upload attempt is.
///
/// Idle → Validating → Rejected
///                   → GateCheck → RateLimited
///                               → Processing → Complete | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeState {
    Idle,
    Validating,
    Rejected,
    GateCheck,
    RateLimited,
    Processing,
    Complete,
    Failed,
}

impl IntakeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::RateLimited | Self::Complete | Self::Failed
        )
    }
}

/// What a successful intake hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReport {
    pub attempt_id: Uuid,
    pub file_name: String,
    pub result: AnalysisResult,
}

/// The single in-flight attempt. Held from the first state change to the
/// terminal one; released on drop.
///
/// If the attempt is dropped mid-processing the published state goes back to
/// `Idle`. The gate mark already made stays committed.
struct AttemptSlot<'a> {
    in_flight: &'a AtomicBool,
    state_tx: &'a watch::Sender<IntakeState>,
    processing: bool,
}

impl Drop for AttemptSlot<'_> {
    fn drop(&mut self) {
        if self.processing {
            debug!("Intake dropped while processing; discarding result");
            self.state_tx.send_replace(IntakeState::Idle);
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

/// Owns the upload workflow. Drag-and-drop and the file picker both funnel
/// into `intake`.
pub struct IntakeController {
    gate: Arc<ScanGate>,
    analyzer: Arc<dyn Analyzer>,
    delay: Arc<dyn AnalysisDelay>,
    display: Arc<dyn ResultDisplay>,
    notifier: Arc<dyn Notifier>,
    state_tx: watch::Sender<IntakeState>,
    in_flight: AtomicBool,
}

impl IntakeController {
    pub fn new(
        gate: Arc<ScanGate>,
        display: Arc<dyn ResultDisplay>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state_tx, _) = watch::channel(IntakeState::Idle);
        Self {
            gate,
            analyzer: Arc::new(StaticAnalyzer),
            delay: Arc::new(FixedDelay(DEFAULT_ANALYSIS_DELAY)),
            display,
            notifier,
            state_tx,
            in_flight: AtomicBool::new(false),
        }
    }

    /// File-backed gate on the local clock, delay and label format from config.
    pub fn from_config(
        config: &Config,
        display: Arc<dyn ResultDisplay>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let gate = ScanGate::new(
            Box::new(JsonFileStore::new(&config.store_path)),
            Arc::new(LocalClock),
        )
        .with_label_format(&config.date_label_format);
        info!(
            "Intake ready (store: {}, delay: {:?})",
            config.store_path.display(),
            config.analysis_delay
        );
        Self::new(Arc::new(gate), display, notifier)
            .with_delay(Arc::new(FixedDelay(config.analysis_delay)))
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn AnalysisDelay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn gate(&self) -> &ScanGate {
        &self.gate
    }

    pub fn state(&self) -> IntakeState {
        *self.state_tx.borrow()
    }

    /// Live view of the state, e.g. to show a spinner while `Processing`.
    pub fn subscribe(&self) -> watch::Receiver<IntakeState> {
        self.state_tx.subscribe()
    }

    /// True while an attempt is between `Validating` and its terminal state.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Drop zone entry: the first PDF among the dropped files is taken.
    pub async fn intake_dropped(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<IntakeReport, IntakeError> {
        let slot = self.begin()?;
        let first_type = files.first().map(|f| f.media_type.clone());
        match first_pdf(files) {
            Some(file) => self.run_attempt(slot, file).await,
            None => {
                self.set_state(IntakeState::Validating);
                Err(self.reject(first_type.unwrap_or_default()))
            }
        }
    }

    /// File picker entry: only the first selected file is considered.
    pub async fn intake_selected(
        &self,
        file: Option<UploadedFile>,
    ) -> Result<IntakeReport, IntakeError> {
        let slot = self.begin()?;
        match file {
            Some(file) => self.run_attempt(slot, file).await,
            None => {
                self.set_state(IntakeState::Validating);
                Err(self.reject(String::new()))
            }
        }
    }

    /// Starts an attempt. Refused with `IntakeError::Busy`, leaving the
    /// published state alone, while another attempt is in flight.
    pub async fn intake(&self, file: UploadedFile) -> Result<IntakeReport, IntakeError> {
        let slot = self.begin()?;
        self.run_attempt(slot, file).await
    }

    async fn run_attempt(
        &self,
        slot: AttemptSlot<'_>,
        file: UploadedFile,
    ) -> Result<IntakeReport, IntakeError> {
        let attempt_id = Uuid::new_v4();
        let span = info_span!(
            "intake",
            %attempt_id,
            file_name = %file.name,
            media_type = %file.media_type
        );
        self.run(slot, attempt_id, file).instrument(span).await
    }

    /// Closes the result display. Returns to `Idle` unless a new attempt is
    /// already in flight.
    pub fn dismiss(&self) {
        self.display.dismiss();
        if !self.is_busy() {
            self.set_state(IntakeState::Idle);
        }
    }

    fn begin(&self) -> Result<AttemptSlot<'_>, IntakeError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Upload ignored, another scan is still in progress");
            return Err(IntakeError::Busy);
        }
        Ok(AttemptSlot {
            in_flight: &self.in_flight,
            state_tx: &self.state_tx,
            processing: false,
        })
    }

    async fn run(
        &self,
        mut slot: AttemptSlot<'_>,
        attempt_id: Uuid,
        file: UploadedFile,
    ) -> Result<IntakeReport, IntakeError> {
        self.set_state(IntakeState::Validating);
        if !file.is_pdf() {
            return Err(self.reject(file.media_type));
        }

        self.set_state(IntakeState::GateCheck);
        if let Err(next_scan_date) = self.gate.try_claim_today() {
            self.set_state(IntakeState::RateLimited);
            info!("Daily limit reached, next scan on {next_scan_date}");
            let err = IntakeError::DailyLimitReached { next_scan_date };
            self.notifier.notify(err.to_notice());
            return Err(err);
        }

        self.set_state(IntakeState::Processing);
        slot.processing = true;
        info!("Scan accepted, analyzing with {} backend", self.analyzer.backend());

        self.delay.wait().await;
        let analyzed = match self.analyzer.analyze(&file).await {
            Ok(result) => result
                .ensure_bounded()
                .map(|_| result)
                .map_err(IntakeError::Analysis),
            Err(e) => Err(e),
        };
        slot.processing = false;

        let result = match analyzed {
            Ok(result) => result,
            Err(err) => {
                self.set_state(IntakeState::Failed);
                warn!("Analysis failed: {err}");
                self.notifier.notify(err.to_notice());
                return Err(err);
            }
        };

        self.set_state(IntakeState::Complete);
        info!(
            score = result.score,
            band = result.score_band().label(),
            "Analysis complete"
        );
        self.display.open(result.clone(), &file.name);

        Ok(IntakeReport {
            attempt_id,
            file_name: file.name,
            result,
        })
    }

    fn reject(&self, media_type: String) -> IntakeError {
        self.set_state(IntakeState::Rejected);
        info!("Rejected upload with media type '{media_type}'");
        let err = IntakeError::InvalidFileType { media_type };
        self.notifier.notify(err.to_notice());
        err
    }

    fn set_state(&self, state: IntakeState) {
        debug!(?state, "intake transition");
        self.state_tx.send_replace(state);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
