//! Estimator catalog built from the search pipeline definition

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Display type of a trainer or transform (e.g. `LightGbmBinary`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstimatorType(String);

impl EstimatorType {
    /// Wrap an estimator type name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EstimatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One named stage of the search pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    name: String,
    estimator_type: EstimatorType,
}

impl PipelineStage {
    /// Create a stage.
    #[must_use]
    pub fn new(name: impl Into<String>, estimator_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            estimator_type: EstimatorType::new(estimator_type),
        }
    }

    /// Get the stage name as it appears in trial schema strings.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the estimator type.
    #[must_use]
    pub const fn estimator_type(&self) -> &EstimatorType {
        &self.estimator_type
    }
}

/// Full search pipeline: every stage any trial may use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPipeline {
    stages: Vec<PipelineStage>,
}

impl SearchPipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    #[must_use]
    pub fn stage(mut self, name: impl Into<String>, estimator_type: impl Into<String>) -> Self {
        self.stages.push(PipelineStage::new(name, estimator_type));
        self
    }

    /// Get the stages in definition order.
    #[must_use]
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }
}

/// Stage name to estimator type lookup.
///
/// Built once per monitor and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EstimatorCatalog {
    estimators: FxHashMap<String, EstimatorType>,
}

impl EstimatorCatalog {
    /// Build the catalog from a pipeline definition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if a stage name is empty or defined twice.
    pub fn from_pipeline(pipeline: &SearchPipeline) -> Result<Self> {
        let mut estimators = FxHashMap::default();
        for stage in pipeline.stages() {
            let name = stage.name().trim();
            if name.is_empty() {
                return Err(Error::InvalidInput(
                    "pipeline stage name must not be empty".to_string(),
                ));
            }
            if estimators
                .insert(name.to_string(), stage.estimator_type().clone())
                .is_some()
            {
                return Err(Error::InvalidInput(format!(
                    "pipeline stage '{name}' is defined more than once"
                )));
            }
        }
        Ok(Self { estimators })
    }

    /// Look up a stage by name.
    #[must_use]
    pub fn get(&self, stage: &str) -> Option<&EstimatorType> {
        self.estimators.get(stage)
    }

    /// Number of stages in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }
}

/// Resolved trainer of a trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerIdentity {
    stage: String,
    estimator_type: EstimatorType,
}

impl TrainerIdentity {
    /// Create a trainer identity.
    #[must_use]
    pub fn new(stage: impl Into<String>, estimator_type: EstimatorType) -> Self {
        Self {
            stage: stage.into(),
            estimator_type,
        }
    }

    /// Get the pipeline stage name.
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Get the estimator type.
    #[must_use]
    pub const fn estimator_type(&self) -> &EstimatorType {
        &self.estimator_type
    }
}

impl fmt::Display for TrainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.estimator_type, f)
    }
}
