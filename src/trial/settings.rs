//! Trial Settings - the configuration the engine sampled for one trial

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter key holding the pipeline description.
pub const PIPELINE_KEY: &str = "_pipeline_";

/// Key inside [`PIPELINE_KEY`] holding the `*`-separated stage schema.
pub const SCHEMA_KEY: &str = "_SCHEMA_";

/// Settings of a single trial.
///
/// The parameter bag is opaque to the monitor except for the
/// `_pipeline_._SCHEMA_` entry, a `*`-separated list of stage names whose
/// last segment is the estimator this trial trains. Engines that can expose
/// the chosen stage directly set `selected_stage` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialSettings {
    trial_id: u64,
    parameter: Map<String, Value>,
    selected_stage: Option<String>,
    started_at: DateTime<Utc>,
}

impl TrialSettings {
    /// Create settings from a raw parameter bag.
    ///
    /// # Arguments
    ///
    /// * `trial_id` - Identifier the engine assigned to the trial
    /// * `parameter` - Parameter path to sampled value
    #[must_use]
    pub fn new(trial_id: u64, parameter: Map<String, Value>) -> Self {
        Self {
            trial_id,
            parameter,
            selected_stage: None,
            started_at: Utc::now(),
        }
    }

    /// Create a builder for constructing settings with optional fields.
    #[must_use]
    pub fn builder(trial_id: u64) -> TrialSettingsBuilder {
        TrialSettingsBuilder::new(trial_id)
    }

    /// Get the trial ID.
    #[must_use]
    pub const fn trial_id(&self) -> u64 {
        self.trial_id
    }

    /// Get the full parameter bag.
    #[must_use]
    pub const fn parameters(&self) -> &Map<String, Value> {
        &self.parameter
    }

    /// Get one parameter by key.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameter.get(key)
    }

    /// Get the stage the engine reported as chosen, if it reports one.
    #[must_use]
    pub fn selected_stage(&self) -> Option<&str> {
        self.selected_stage.as_deref()
    }

    /// Get the timestamp the trial started at.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Builder for `TrialSettings`.
#[derive(Debug)]
pub struct TrialSettingsBuilder {
    trial_id: u64,
    parameter: Map<String, Value>,
    selected_stage: Option<String>,
    started_at: DateTime<Utc>,
}

impl TrialSettingsBuilder {
    /// Create a new builder with an empty parameter bag.
    #[must_use]
    pub fn new(trial_id: u64) -> Self {
        Self {
            trial_id,
            parameter: Map::new(),
            selected_stage: None,
            started_at: Utc::now(),
        }
    }

    /// Set one parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameter.insert(key.into(), value);
        self
    }

    /// Set the `_pipeline_._SCHEMA_` string, keeping other pipeline entries.
    #[must_use]
    pub fn pipeline_schema(mut self, schema: impl Into<String>) -> Self {
        let pipeline = self
            .parameter
            .entry(PIPELINE_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !pipeline.is_object() {
            *pipeline = Value::Object(Map::new());
        }
        if let Value::Object(entries) = pipeline {
            entries.insert(SCHEMA_KEY.to_string(), Value::String(schema.into()));
        }
        self
    }

    /// Set the typed chosen stage.
    #[must_use]
    pub fn selected_stage(mut self, stage: impl Into<String>) -> Self {
        self.selected_stage = Some(stage.into());
        self
    }

    /// Set a custom start timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Build the `TrialSettings`.
    #[must_use]
    pub fn build(self) -> TrialSettings {
        TrialSettings {
            trial_id: self.trial_id,
            parameter: self.parameter,
            selected_stage: self.selected_stage,
            started_at: self.started_at,
        }
    }
}
