//! Mutex-guarded monitor handle for engines that report concurrently

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::trial::{FailureKind, TrialResult, TrialSettings};

use super::{Leaderboard, ResourcePeaks, TrialMonitor, TrialObserver};

/// Cloneable handle that serializes events into one [`TrialMonitor`].
///
/// Each callback holds the lock for the whole event, so appending a trial and
/// raising the resource peaks happen as one unit.
///
/// # Example
///
/// ```rust
/// use std::thread;
/// use vigia::monitor::{SharedMonitor, TrialMonitor};
/// use vigia::pipeline::SearchPipeline;
/// use vigia::trial::{TrialResult, TrialSettings};
///
/// let pipeline = SearchPipeline::new().stage("e0", "FastForestBinary");
/// let shared = SharedMonitor::new(TrialMonitor::new(&pipeline)?);
///
/// let handles: Vec<_> = (0..4)
///     .map(|id| {
///         let monitor = shared.clone();
///         thread::spawn(move || {
///             let settings = TrialSettings::builder(id).pipeline_schema("e0").build();
///             monitor.trial_completed(TrialResult::new(settings, 0.5, 0.5, 1.0));
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().expect("worker panicked");
/// }
///
/// assert_eq!(shared.with(|m| m.completed_trials().len()), 4);
/// # Ok::<(), vigia::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SharedMonitor {
    inner: Arc<Mutex<TrialMonitor>>,
}

impl SharedMonitor {
    /// Wrap a monitor.
    #[must_use]
    pub fn new(monitor: TrialMonitor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(monitor)),
        }
    }

    /// Run `f` with exclusive access to the monitor.
    pub fn with<R>(&self, f: impl FnOnce(&mut TrialMonitor) -> R) -> R {
        f(&mut *self.lock())
    }

    /// See [`TrialObserver::on_trial_running`].
    pub fn trial_running(&self, settings: &TrialSettings) {
        self.lock().on_trial_running(settings);
    }

    /// See [`TrialObserver::on_trial_completed`].
    pub fn trial_completed(&self, result: TrialResult) {
        self.lock().on_trial_completed(result);
    }

    /// See [`TrialObserver::on_trial_best`].
    pub fn trial_best(&self, result: TrialResult) {
        self.lock().on_trial_best(result);
    }

    /// See [`TrialObserver::on_trial_failed`].
    pub fn trial_failed(&self, settings: &TrialSettings, error: &str) -> FailureKind {
        self.lock().on_trial_failed(settings, error)
    }

    /// Snapshot of the best trials.
    #[must_use]
    pub fn best_trials(&self) -> Vec<TrialResult> {
        self.lock().best_trials().to_vec()
    }

    /// Snapshot of the completed trials.
    #[must_use]
    pub fn completed_trials(&self) -> Vec<TrialResult> {
        self.lock().completed_trials().to_vec()
    }

    /// Current resource peaks.
    #[must_use]
    pub fn peaks(&self) -> ResourcePeaks {
        self.lock().peaks()
    }

    /// Completed trials ranked by descending metric.
    #[must_use]
    pub fn completed_leaderboard(&self) -> Leaderboard {
        self.lock().completed_leaderboard()
    }

    /// Unwrap the monitor if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns the handle back if other clones are still alive.
    pub fn try_into_inner(self) -> Result<TrialMonitor, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map_err(|inner| Self { inner })
    }

    // A panic inside one callback must not wedge the monitor for the rest of the run.
    fn lock(&self) -> MutexGuard<'_, TrialMonitor> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TrialObserver for SharedMonitor {
    fn on_trial_running(&mut self, settings: &TrialSettings) {
        self.trial_running(settings);
    }

    fn on_trial_completed(&mut self, result: TrialResult) {
        self.trial_completed(result);
    }

    fn on_trial_best(&mut self, result: TrialResult) {
        self.trial_best(result);
    }

    fn on_trial_failed(&mut self, settings: &TrialSettings, error: &str) -> FailureKind {
        self.trial_failed(settings, error)
    }
}
