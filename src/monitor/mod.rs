//! Trial monitor
//!
//! Observes the search engine's trial lifecycle callbacks and keeps the run's
//! history: every completed trial, every trial the engine declared best, and
//! the peak CPU and memory seen so far.
//!
//! ## Concurrency
//!
//! [`TrialMonitor`] holds no lock. Its callbacks take `&mut self`, so the
//! engine must deliver events for one monitor one at a time (single writer).
//! Engines that report from several threads at once wrap the monitor in a
//! [`SharedMonitor`], which serializes each event behind a mutex.
//!
//! ## Usage
//!
//! ```rust
//! use vigia::monitor::{TrialMonitor, TrialObserver};
//! use vigia::pipeline::SearchPipeline;
//! use vigia::trial::{TrialResult, TrialSettings};
//!
//! let pipeline = SearchPipeline::new()
//!     .stage("e0", "Concatenate")
//!     .stage("e1", "LightGbmBinary");
//! let mut monitor = TrialMonitor::new(&pipeline)?;
//!
//! let settings = TrialSettings::builder(0).pipeline_schema("e0*e1").build();
//! monitor.on_trial_running(&settings);
//!
//! let result = TrialResult::builder(settings, 0.87, 0.13, 950.0)
//!     .peak_memory_mb(310.0)
//!     .build();
//! monitor.on_trial_completed(result.clone());
//! monitor.on_trial_best(result.clone());
//!
//! let trainer = monitor.final_best_trainer(&result)?;
//! assert_eq!(trainer.to_string(), "LightGbmBinary");
//! assert_eq!(monitor.peaks().memory_mb, Some(310.0));
//! # Ok::<(), vigia::Error>(())
//! ```

mod leaderboard;
mod progress;
mod shared;

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{MetricKind, TrainerSettings};
use crate::pipeline::{
    EstimatorCatalog, SchemaStringResolver, SearchPipeline, TrainerIdentity, TrainerResolver,
};
use crate::trial::{FailureKind, TrialResult, TrialSettings};
use crate::Result;

pub use leaderboard::{Leaderboard, LeaderboardEntry, ResourcePeaks, RunSummary, TrainerLabel};
pub use progress::{Progress, Stopwatch};
pub use shared::SharedMonitor;

/// Lifecycle callbacks the search engine invokes.
///
/// None of the callbacks fail: a trial whose trainer cannot be resolved is
/// still recorded, and the resolution error is logged.
pub trait TrialObserver {
    /// A trial started.
    fn on_trial_running(&mut self, settings: &TrialSettings);

    /// A trial finished, successfully or not scored.
    fn on_trial_completed(&mut self, result: TrialResult);

    /// The engine declared `result` the new best trial.
    fn on_trial_best(&mut self, result: TrialResult);

    /// A trial raised an error. Returns how the error was classified.
    fn on_trial_failed(&mut self, settings: &TrialSettings, error: &str) -> FailureKind;
}

/// Phase of the search run as seen by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonitorPhase {
    /// Created, no event received yet.
    Idle,
    /// At least one event received.
    Running,
    /// Final result resolved, clock stopped.
    Finished,
}

/// Failed trial tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureCounts {
    /// Trials cancelled by the time budget.
    pub budget_exceeded: usize,
    /// Trials that failed for any other reason.
    pub generic: usize,
}

/// Accumulates trial history for one search run.
pub struct TrialMonitor {
    catalog: EstimatorCatalog,
    resolver: Box<dyn TrainerResolver>,
    metric: MetricKind,
    time_budget: Option<Duration>,
    best: Vec<TrialResult>,
    completed: Vec<TrialResult>,
    peaks: ResourcePeaks,
    failures: FailureCounts,
    phase: MonitorPhase,
    stopwatch: Stopwatch,
}

impl std::fmt::Debug for TrialMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialMonitor")
            .field("stages", &self.catalog.len())
            .field("metric", &self.metric)
            .field("best", &self.best.len())
            .field("completed", &self.completed.len())
            .field("peaks", &self.peaks)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl TrialMonitor {
    /// Create a monitor with the schema-string resolver and no time budget.
    ///
    /// Starts the run clock.
    ///
    /// # Errors
    ///
    /// Returns error if the pipeline defines a stage name twice.
    pub fn new(pipeline: &SearchPipeline) -> Result<Self> {
        Self::builder(pipeline).build()
    }

    /// Create a builder for a monitor with a custom resolver, metric or budget.
    #[must_use]
    pub fn builder(pipeline: &SearchPipeline) -> TrialMonitorBuilder<'_> {
        TrialMonitorBuilder::new(pipeline)
    }

    /// Trials declared best, in the order the engine declared them.
    #[must_use]
    pub fn best_trials(&self) -> &[TrialResult] {
        &self.best
    }

    /// Every completed trial, in completion order.
    #[must_use]
    pub fn completed_trials(&self) -> &[TrialResult] {
        &self.completed
    }

    /// Peak CPU and memory over completed trials.
    #[must_use]
    pub const fn peaks(&self) -> ResourcePeaks {
        self.peaks
    }

    /// Failed trial tallies.
    #[must_use]
    pub const fn failures(&self) -> FailureCounts {
        self.failures
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> MonitorPhase {
        self.phase
    }

    /// Metric the engine ranks trials by.
    #[must_use]
    pub const fn metric(&self) -> MetricKind {
        self.metric
    }

    /// Estimator catalog built from the search pipeline.
    #[must_use]
    pub const fn catalog(&self) -> &EstimatorCatalog {
        &self.catalog
    }

    /// Progress against the time budget.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.stopwatch.elapsed(), self.time_budget)
    }

    /// Resolve the trainer of a trial with this monitor's resolver.
    ///
    /// # Errors
    ///
    /// Returns `Error::SchemaMissing` or `Error::UnknownStage`.
    pub fn resolve_trainer(&self, settings: &TrialSettings) -> Result<TrainerIdentity> {
        self.resolver.resolve(settings, &self.catalog)
    }

    /// Best trials ranked by descending metric.
    #[must_use]
    pub fn best_leaderboard(&self) -> Leaderboard {
        Leaderboard::rank(&self.best, &self.catalog, self.resolver.as_ref())
    }

    /// Completed trials ranked by descending metric.
    #[must_use]
    pub fn completed_leaderboard(&self) -> Leaderboard {
        Leaderboard::rank(&self.completed, &self.catalog, self.resolver.as_ref())
    }

    /// Stop the run clock and resolve the final winner's trainer.
    ///
    /// Only the first call stops the clock.
    ///
    /// # Errors
    ///
    /// Returns `Error::SchemaMissing` or `Error::UnknownStage`; the clock is
    /// stopped either way.
    pub fn final_best_trainer(&mut self, result: &TrialResult) -> Result<TrainerIdentity> {
        let elapsed = self.stopwatch.stop();
        self.phase = MonitorPhase::Finished;
        let trainer = self.resolve_trainer(result.settings())?;
        info!(
            trainer = %trainer,
            trial_id = result.trial_id(),
            elapsed_s = elapsed.as_secs_f64(),
            "search finished"
        );
        Ok(trainer)
    }

    /// Finish the run and build the summary for the final winner.
    ///
    /// # Errors
    ///
    /// As [`final_best_trainer`](Self::final_best_trainer).
    pub fn summarize(&mut self, result: &TrialResult) -> Result<RunSummary> {
        let trainer = self.final_best_trainer(result)?;
        Ok(RunSummary {
            trainer,
            metric_kind: self.metric,
            metric: result.metric(),
            duration_ms: result.duration_ms(),
            peaks: self.peaks,
            elapsed: self.stopwatch.elapsed(),
            model: result.model().cloned(),
        })
    }

    fn mark_running(&mut self) {
        if self.phase == MonitorPhase::Idle {
            self.phase = MonitorPhase::Running;
        }
    }

    fn trainer_label(&self, settings: &TrialSettings) -> Option<TrainerIdentity> {
        match self.resolve_trainer(settings) {
            Ok(trainer) => Some(trainer),
            Err(e) => {
                warn!(trial_id = settings.trial_id(), error = %e, "cannot resolve trainer");
                None
            }
        }
    }
}

impl TrialObserver for TrialMonitor {
    fn on_trial_running(&mut self, settings: &TrialSettings) {
        self.mark_running();
        let progress = self.progress();
        debug!(
            trial_id = settings.trial_id(),
            elapsed_s = progress.elapsed.as_secs(),
            remaining_s = progress.remaining.map(|r| r.as_secs()),
            percent = progress.percent,
            "trial running"
        );
    }

    fn on_trial_completed(&mut self, result: TrialResult) {
        self.mark_running();
        self.peaks.observe(result.peak_cpu(), result.peak_memory_mb());

        if let Some(trainer) = self.trainer_label(result.settings()) {
            debug!(
                trainer = %trainer,
                metric = format_args!("{:.3}", result.metric()),
                duration_ms = result.duration_ms(),
                "trial completed"
            );
        }

        self.completed.push(result);
    }

    fn on_trial_best(&mut self, result: TrialResult) {
        self.mark_running();
        if let Some(trainer) = self.trainer_label(result.settings()) {
            info!(trainer = %trainer, metric = result.metric(), "{trainer} is BEST trial");
        }
        self.best.push(result);
    }

    fn on_trial_failed(&mut self, settings: &TrialSettings, error: &str) -> FailureKind {
        self.mark_running();
        let kind = FailureKind::classify(error);
        match kind {
            FailureKind::BudgetExceeded => {
                self.failures.budget_exceeded += 1;
                error!(
                    trial_id = settings.trial_id(),
                    "trial cancelled, time budget exceeded"
                );
            }
            FailureKind::GenericFailure => {
                self.failures.generic += 1;
                error!(trial_id = settings.trial_id(), error, "trial failed");
            }
        }
        kind
    }
}

/// Builder for `TrialMonitor`.
pub struct TrialMonitorBuilder<'a> {
    pipeline: &'a SearchPipeline,
    resolver: Box<dyn TrainerResolver>,
    metric: MetricKind,
    time_budget: Option<Duration>,
}

impl<'a> TrialMonitorBuilder<'a> {
    /// Create a builder with the schema-string resolver.
    #[must_use]
    pub fn new(pipeline: &'a SearchPipeline) -> Self {
        Self {
            pipeline,
            resolver: Box::new(SchemaStringResolver),
            metric: MetricKind::Accuracy,
            time_budget: None,
        }
    }

    /// Use a different trainer resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: impl TrainerResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Set the metric trials are ranked by.
    #[must_use]
    pub const fn metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Set the search time budget used for progress reporting.
    #[must_use]
    pub const fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Take metric and time budget from the run settings.
    #[must_use]
    pub fn settings(self, settings: &TrainerSettings) -> Self {
        self.metric(settings.scenario().ranking_metric())
            .time_budget(settings.training_time())
    }

    /// Build the monitor and start its clock.
    ///
    /// # Errors
    ///
    /// Returns error if the pipeline defines a stage name twice.
    pub fn build(self) -> Result<TrialMonitor> {
        let catalog = EstimatorCatalog::from_pipeline(self.pipeline)?;
        Ok(TrialMonitor {
            catalog,
            resolver: self.resolver,
            metric: self.metric,
            time_budget: self.time_budget,
            best: Vec::new(),
            completed: Vec::new(),
            peaks: ResourcePeaks::default(),
            failures: FailureCounts::default(),
            phase: MonitorPhase::Idle,
            stopwatch: Stopwatch::start(),
        })
    }
}
