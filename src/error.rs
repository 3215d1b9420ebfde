//! Error types for vigia
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Vigia error types
#[derive(Error, Debug)]
pub enum Error {
    /// Trial parameters carry no `_pipeline_._SCHEMA_` string
    #[error("Pipeline schema missing for trial {trial_id}: {reason}\nThe search engine and monitor disagree on the trial parameter layout.")]
    SchemaMissing {
        /// Trial whose parameters were inspected
        trial_id: u64,
        /// What was missing
        reason: String,
    },

    /// Schema names a stage the estimator catalog does not know
    #[error("Unknown pipeline stage '{stage}' for trial {trial_id}\nThe estimator catalog is out of sync with the search pipeline.")]
    UnknownStage {
        /// Trial whose schema was resolved
        trial_id: u64,
        /// Stage name taken from the schema string
        stage: String,
    },

    /// Inputs with inconsistent row counts or grouping keys
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Actual shape
        actual: String,
    },

    /// Permutation statistics lack the metric selected for the scenario
    #[error("Metric '{metric}' missing for slot '{slot}'")]
    MissingMetric {
        /// Metric name
        metric: String,
        /// Feature slot name
        slot: String,
    },

    /// Invalid input parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Settings file failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error (settings file, parameter bags)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
