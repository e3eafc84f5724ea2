//! Shared run state for long-lived hosts.
//!
//! A [`RunHandle`] owns the status of the single analysis that may be in
//! flight and the last published [`AnalysisOutcome`]. Hosts poll
//! [`RunHandle::snapshot`] while a worker thread runs the pipeline.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::pipeline::{
    AnalysisError, AnalysisInputs, AnalysisOutcome, PipelineStage, ProgressObserver, run_analysis,
};

/// Lifecycle of the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing has run since creation or the last reset.
    NotStarted,
    /// A run is executing `stage`.
    InProgress {
        /// Stage currently executing.
        stage: PipelineStage,
    },
    /// The last run finished and its outcome is published.
    Complete,
    /// The last run failed; any earlier outcome is still published.
    Failed {
        /// Failure description.
        message: String,
    },
}

impl RunStatus {
    /// Whether a run is executing.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

/// Point-in-time copy of the run state.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    /// Current status.
    pub status: RunStatus,
    /// Progress in percent.
    pub progress: u8,
    /// Human-readable progress message.
    pub message: String,
    /// Last successfully published outcome.
    pub outcome: Option<Arc<AnalysisOutcome>>,
}

/// Errors raised by [`RunHandle`].
#[derive(Debug, Error)]
pub enum RunError {
    /// Another run is in flight.
    #[error("an analysis is already running")]
    AlreadyRunning,
    /// The worker thread could not be spawned.
    #[error("failed to spawn analysis worker: {source}")]
    Spawn {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The pipeline itself failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug)]
struct RunState {
    status: RunStatus,
    progress: u8,
    message: String,
    outcome: Option<Arc<AnalysisOutcome>>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            status: RunStatus::NotStarted,
            progress: 0,
            message: String::new(),
            outcome: None,
        }
    }
}

/// Cloneable handle to shared run state.
///
/// # Examples
/// ```
/// use footfall_core::{AnalysisConfig, AnalysisInputs, PoiCatalog, Region, RunHandle, RunStatus};
///
/// let handle = RunHandle::new();
/// let inputs = AnalysisInputs {
///     config: AnalysisConfig::default(),
///     region: Region::westminster(),
///     catalog: PoiCatalog::default(),
///     bins: Vec::new(),
/// };
/// handle.run_blocking(inputs).expect("analysis");
/// let snapshot = handle.snapshot();
/// assert_eq!(snapshot.status, RunStatus::Complete);
/// assert_eq!(snapshot.progress, 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunHandle {
    state: Arc<Mutex<RunState>>,
}

struct StateObserver<'a> {
    handle: &'a RunHandle,
}

impl ProgressObserver for StateObserver<'_> {
    fn on_stage(&mut self, stage: PipelineStage) {
        let mut state = self.handle.lock();
        if stage != PipelineStage::Complete {
            state.status = RunStatus::InProgress { stage };
        }
        state.progress = stage.progress();
        state.message = stage.description().to_owned();
    }
}

/// Marks the run failed when the pipeline unwinds before reporting back.
struct UnwindGuard<'a> {
    handle: &'a RunHandle,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("analysis worker panicked");
            self.handle.fail("analysis worker panicked".to_owned());
        }
    }
}

impl RunHandle {
    /// A handle with no run recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy the current state.
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        let state = self.lock();
        RunSnapshot {
            status: state.status.clone(),
            progress: state.progress,
            message: state.message.clone(),
            outcome: state.outcome.clone(),
        }
    }

    /// Last published outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<Arc<AnalysisOutcome>> {
        self.lock().outcome.clone()
    }

    fn begin(&self) -> Result<(), RunError> {
        let mut state = self.lock();
        if state.status.is_running() {
            return Err(RunError::AlreadyRunning);
        }
        state.status = RunStatus::InProgress {
            stage: PipelineStage::BuildingGrid,
        };
        state.progress = 0;
        state.message = "Starting analysis".to_owned();
        Ok(())
    }

    fn fail(&self, message: String) {
        let mut state = self.lock();
        state.status = RunStatus::Failed {
            message: message.clone(),
        };
        state.message = message;
    }

    fn execute(&self, inputs: AnalysisInputs) -> Result<Arc<AnalysisOutcome>, AnalysisError> {
        self.execute_with(inputs, run_analysis)
    }

    fn execute_with<F>(
        &self,
        inputs: AnalysisInputs,
        analyse: F,
    ) -> Result<Arc<AnalysisOutcome>, AnalysisError>
    where
        F: FnOnce(
            AnalysisInputs,
            &mut dyn ProgressObserver,
        ) -> Result<AnalysisOutcome, AnalysisError>,
    {
        let _guard = UnwindGuard { handle: self };
        let mut observer = StateObserver { handle: self };
        match analyse(inputs, &mut observer) {
            Ok(outcome) => {
                let published = Arc::new(outcome);
                let mut state = self.lock();
                state.outcome = Some(Arc::clone(&published));
                state.status = RunStatus::Complete;
                state.progress = PipelineStage::Complete.progress();
                state.message = PipelineStage::Complete.description().to_owned();
                Ok(published)
            }
            Err(err) => {
                log::error!("analysis failed: {err}");
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Run the pipeline on the calling thread and publish the outcome.
    ///
    /// # Errors
    /// Returns [`RunError::AlreadyRunning`] when another run is in flight and
    /// [`RunError::Analysis`] when the pipeline fails; a failure leaves the
    /// previous outcome published.
    pub fn run_blocking(&self, inputs: AnalysisInputs) -> Result<Arc<AnalysisOutcome>, RunError> {
        self.begin()?;
        Ok(self.execute(inputs)?)
    }

    /// Run the pipeline on a worker thread.
    ///
    /// Join the returned handle to wait for completion; progress and the
    /// result are visible through [`Self::snapshot`].
    ///
    /// # Errors
    /// Returns [`RunError::AlreadyRunning`] when another run is in flight and
    /// [`RunError::Spawn`] when the worker cannot be created.
    pub fn start(&self, inputs: AnalysisInputs) -> Result<JoinHandle<()>, RunError> {
        self.begin()?;
        let worker = self.clone();
        thread::Builder::new()
            .name("footfall-analysis".to_owned())
            .spawn(move || {
                if worker.execute(inputs).is_ok() {
                    log::info!("analysis published");
                }
            })
            .map_err(|source| {
                self.fail(format!("failed to spawn analysis worker: {source}"));
                RunError::Spawn { source }
            })
    }

    /// Forget the last run and its outcome.
    ///
    /// # Errors
    /// Returns [`RunError::AlreadyRunning`] while a run is in flight.
    pub fn reset(&self) -> Result<(), RunError> {
        let mut state = self.lock();
        if state.status.is_running() {
            return Err(RunError::AlreadyRunning);
        }
        *state = RunState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::geometry::Region;
    use crate::poi::PoiCatalog;
    use geo::{Coord, Rect};
    use rstest::{fixture, rstest};

    #[fixture]
    fn inputs() -> AnalysisInputs {
        AnalysisInputs {
            config: AnalysisConfig::default(),
            region: Region::westminster(),
            catalog: PoiCatalog::default(),
            bins: Vec::new(),
        }
    }

    fn failing(mut base: AnalysisInputs) -> AnalysisInputs {
        base.region = Region::from_rect(
            "nowhere",
            Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 11.0, y: 11.0 }),
        );
        base
    }

    #[rstest]
    fn fresh_handle_has_not_started() {
        let snapshot = RunHandle::new().snapshot();
        assert_eq!(snapshot.status, RunStatus::NotStarted);
        assert!(snapshot.outcome.is_none());
    }

    #[rstest]
    fn start_publishes_outcome(inputs: AnalysisInputs) {
        let handle = RunHandle::new();
        let worker = handle.start(inputs).expect("spawn worker");
        worker.join().expect("worker finished");
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, RunStatus::Complete);
        assert_eq!(snapshot.progress, 100);
        assert!(snapshot.outcome.is_some());
    }

    #[rstest]
    fn concurrent_start_is_rejected(inputs: AnalysisInputs) {
        let handle = RunHandle::new();
        handle.begin().expect("first run begins");
        let err = handle.run_blocking(inputs).expect_err("second run rejected");
        assert!(matches!(err, RunError::AlreadyRunning));
        assert!(matches!(handle.reset(), Err(RunError::AlreadyRunning)));
    }

    #[rstest]
    fn failure_keeps_previous_outcome(inputs: AnalysisInputs) {
        let handle = RunHandle::new();
        let first = handle.run_blocking(inputs.clone()).expect("first run");
        let err = handle.run_blocking(failing(inputs)).expect_err("empty grid");
        assert!(matches!(err, RunError::Analysis(AnalysisError::EmptyGrid { .. })));

        let snapshot = handle.snapshot();
        assert!(matches!(snapshot.status, RunStatus::Failed { .. }));
        let kept = snapshot.outcome.expect("previous outcome kept");
        assert!(Arc::ptr_eq(&kept, &first));
    }

    #[rstest]
    fn panicking_run_is_marked_failed(inputs: AnalysisInputs) {
        let handle = RunHandle::new();
        let first = handle.run_blocking(inputs.clone()).expect("first run");
        handle.begin().expect("second run begins");
        let worker = handle.clone();
        let joined = thread::spawn(move || {
            worker.execute_with(inputs, |_, _| panic!("scoring stage blew up"))
        })
        .join();
        assert!(joined.is_err());

        let snapshot = handle.snapshot();
        assert_eq!(
            snapshot.status,
            RunStatus::Failed {
                message: "analysis worker panicked".to_owned()
            }
        );
        let kept = snapshot.outcome.expect("previous outcome kept");
        assert!(Arc::ptr_eq(&kept, &first));
        handle.reset().expect("handle usable after a panic");
    }

    #[rstest]
    fn reset_clears_outcome(inputs: AnalysisInputs) {
        let handle = RunHandle::new();
        handle.run_blocking(inputs).expect("run");
        handle.reset().expect("reset");
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, RunStatus::NotStarted);
        assert!(handle.outcome().is_none());
    }
}
