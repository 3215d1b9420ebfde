//! Trial Result - outcome of a completed trial

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModelArtifact, TrialSettings};

/// Outcome of one completed trial.
///
/// Produced once by the engine when the trial finishes. Resource peaks are
/// optional because not every engine samples them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialResult {
    settings: TrialSettings,
    metric: f64,
    loss: f64,
    duration_ms: f64,
    peak_cpu: Option<f64>,
    peak_memory_mb: Option<f64>,
    model: Option<ModelArtifact>,
    completed_at: DateTime<Utc>,
}

impl TrialResult {
    /// Create a result without resource peaks or model reference.
    ///
    /// # Arguments
    ///
    /// * `settings` - Settings the trial ran with
    /// * `metric` - Score of the ranking metric
    /// * `loss` - Loss the engine minimized
    /// * `duration_ms` - Training time in milliseconds
    #[must_use]
    pub fn new(settings: TrialSettings, metric: f64, loss: f64, duration_ms: f64) -> Self {
        TrialResultBuilder::new(settings, metric, loss, duration_ms).build()
    }

    /// Create a builder for constructing a result with optional fields.
    #[must_use]
    pub fn builder(
        settings: TrialSettings,
        metric: f64,
        loss: f64,
        duration_ms: f64,
    ) -> TrialResultBuilder {
        TrialResultBuilder::new(settings, metric, loss, duration_ms)
    }

    /// Get the trial ID.
    #[must_use]
    pub const fn trial_id(&self) -> u64 {
        self.settings.trial_id()
    }

    /// Get the settings the trial ran with.
    #[must_use]
    pub const fn settings(&self) -> &TrialSettings {
        &self.settings
    }

    /// Get the ranking metric score.
    #[must_use]
    pub const fn metric(&self) -> f64 {
        self.metric
    }

    /// Get the loss.
    #[must_use]
    pub const fn loss(&self) -> f64 {
        self.loss
    }

    /// Get the training time in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Get the peak CPU usage as a fraction of all cores, if sampled.
    #[must_use]
    pub const fn peak_cpu(&self) -> Option<f64> {
        self.peak_cpu
    }

    /// Get the peak memory usage in megabytes, if sampled.
    #[must_use]
    pub const fn peak_memory_mb(&self) -> Option<f64> {
        self.peak_memory_mb
    }

    /// Get the trained model reference, if the engine kept it.
    #[must_use]
    pub const fn model(&self) -> Option<&ModelArtifact> {
        self.model.as_ref()
    }

    /// Get the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// Builder for `TrialResult`.
#[derive(Debug)]
pub struct TrialResultBuilder {
    settings: TrialSettings,
    metric: f64,
    loss: f64,
    duration_ms: f64,
    peak_cpu: Option<f64>,
    peak_memory_mb: Option<f64>,
    model: Option<ModelArtifact>,
    completed_at: DateTime<Utc>,
}

impl TrialResultBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(settings: TrialSettings, metric: f64, loss: f64, duration_ms: f64) -> Self {
        Self {
            settings,
            metric,
            loss,
            duration_ms,
            peak_cpu: None,
            peak_memory_mb: None,
            model: None,
            completed_at: Utc::now(),
        }
    }

    /// Set the peak CPU fraction.
    #[must_use]
    pub const fn peak_cpu(mut self, peak_cpu: f64) -> Self {
        self.peak_cpu = Some(peak_cpu);
        self
    }

    /// Set the peak memory in megabytes.
    #[must_use]
    pub const fn peak_memory_mb(mut self, peak_memory_mb: f64) -> Self {
        self.peak_memory_mb = Some(peak_memory_mb);
        self
    }

    /// Attach the trained model reference.
    #[must_use]
    pub fn model(mut self, model: ModelArtifact) -> Self {
        self.model = Some(model);
        self
    }

    /// Set a custom completion timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = completed_at;
        self
    }

    /// Build the `TrialResult`.
    #[must_use]
    pub fn build(self) -> TrialResult {
        TrialResult {
            settings: self.settings,
            metric: self.metric,
            loss: self.loss,
            duration_ms: self.duration_ms,
            peak_cpu: self.peak_cpu,
            peak_memory_mb: self.peak_memory_mb,
            model: self.model,
            completed_at: self.completed_at,
        }
    }
}
