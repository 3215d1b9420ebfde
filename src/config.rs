//! Run configuration
//!
//! `TrainerSettings` is read from a JSON file before the search starts. It
//! picks the learning scenario (which in turn picks the ranking metric), the
//! search time budget, and the thresholds used by the post-hoc analysis.
//!
//! Keys are PascalCase (`automl.json` as written for the sample trainer);
//! the snake_case spellings are accepted as aliases.
//!
//! ## Example
//!
//! ```rust
//! use vigia::config::{Scenario, TrainerSettings};
//!
//! let json = r#"{
//!     "Scenario": "Regression",
//!     "TrainingTime": 60,
//!     "LabelColumn": "price",
//!     "CsvDataPath": "data/houses.csv",
//!     "ColumnMapping": { "rooms": "Double" }
//! }"#;
//!
//! let settings = TrainerSettings::from_json_str(json)?;
//! assert_eq!(settings.scenario(), Scenario::Regression);
//! assert!((settings.thresholds().correlation - 0.9).abs() < f64::EPSILON);
//! # Ok::<(), vigia::Error>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Learning task of the search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    /// Two-class classification.
    BinaryClassification,
    /// Classification with more than two classes.
    MulticlassClassification,
    /// Continuous target.
    Regression,
}

impl Scenario {
    /// Metric the search optimizes and the importance analysis aggregates.
    #[must_use]
    pub const fn ranking_metric(self) -> MetricKind {
        match self {
            Self::BinaryClassification => MetricKind::Accuracy,
            Self::MulticlassClassification => MetricKind::MicroAccuracy,
            Self::Regression => MetricKind::RSquared,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BinaryClassification => "BinaryClassification",
            Self::MulticlassClassification => "MulticlassClassification",
            Self::Regression => "Regression",
        };
        f.write_str(name)
    }
}

/// Named evaluation metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    /// Binary accuracy.
    Accuracy,
    /// Multiclass micro-averaged accuracy.
    MicroAccuracy,
    /// Multiclass macro-averaged accuracy.
    MacroAccuracy,
    /// Coefficient of determination.
    RSquared,
    /// Mean absolute error.
    MeanAbsoluteError,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accuracy => "Accuracy",
            Self::MicroAccuracy => "MicroAccuracy",
            Self::MacroAccuracy => "MacroAccuracy",
            Self::RSquared => "RSquared",
            Self::MeanAbsoluteError => "MeanAbsoluteError",
        };
        f.write_str(name)
    }
}

/// Column type, named as the schema inference service names its data kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// 8-bit signed integer.
    SByte,
    /// 8-bit unsigned integer.
    Byte,
    /// 16-bit signed integer.
    Int16,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit signed integer.
    Int32,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit float.
    Single,
    /// 64-bit float.
    Double,
    /// Free text or categorical feature.
    String,
    /// Boolean feature.
    Boolean,
    /// Time span.
    TimeSpan,
    /// Date and time.
    DateTime,
    /// Date and time with offset.
    DateTimeOffset,
}

impl ColumnKind {
    /// Whether the column takes part in correlation analysis.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Single
                | Self::Double
        )
    }
}

/// Thresholds for the post-hoc analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AnalysisThresholds {
    /// Features whose merged importance magnitude is below this are deletion candidates.
    #[serde(alias = "importance_deletion")]
    pub importance_deletion: f64,
    /// Feature pairs whose correlation magnitude exceeds this are flagged.
    #[serde(alias = "correlation")]
    pub correlation: f64,
    /// Slot count above which a feature is reported as too wide for permutation importance.
    #[serde(alias = "max_importance_slots")]
    pub max_importance_slots: usize,
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            importance_deletion: 0.01,
            correlation: 0.9,
            max_importance_slots: 20,
        }
    }
}

/// Settings for one search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainerSettings {
    #[serde(alias = "scenario")]
    scenario: Scenario,
    #[serde(rename = "TrainingTime", alias = "training_time_secs")]
    training_time_secs: u32,
    #[serde(alias = "label_column")]
    label_column: String,
    #[serde(alias = "csv_data_path")]
    csv_data_path: PathBuf,
    #[serde(default, alias = "column_mapping", deserialize_with = "null_as_empty")]
    column_mapping: BTreeMap<String, ColumnKind>,
    #[serde(default, alias = "thresholds")]
    thresholds: AnalysisThresholds,
}

// The sample trainer writes `"ColumnMapping": null` when nothing is overridden.
fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, ColumnKind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl TrainerSettings {
    /// Create settings with default thresholds and no column mapping.
    #[must_use]
    pub fn new(
        scenario: Scenario,
        training_time_secs: u32,
        label_column: impl Into<String>,
        csv_data_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scenario,
            training_time_secs,
            label_column: label_column.into(),
            csv_data_path: csv_data_path.into(),
            column_mapping: BTreeMap::new(),
            thresholds: AnalysisThresholds::default(),
        }
    }

    /// Parse and validate settings from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` on malformed JSON and `Error::Config` when
    /// validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check the invariants a search run relies on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(Error::Config("label_column must not be empty".to_string()));
        }
        if self.training_time_secs == 0 {
            return Err(Error::Config(
                "training_time_secs must be greater than 0".to_string(),
            ));
        }
        let t = &self.thresholds;
        if !t.importance_deletion.is_finite() || t.importance_deletion < 0.0 {
            return Err(Error::Config(format!(
                "importance_deletion threshold must be a non-negative number, got {}",
                t.importance_deletion
            )));
        }
        if !t.correlation.is_finite() || !(0.0..=1.0).contains(&t.correlation) {
            return Err(Error::Config(format!(
                "correlation threshold must lie in [0, 1], got {}",
                t.correlation
            )));
        }
        Ok(())
    }

    /// Replace the analysis thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: AnalysisThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Add a column type to the mapping.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.column_mapping.insert(name.into(), kind);
        self
    }

    /// Learning scenario.
    #[must_use]
    pub const fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Search time budget.
    #[must_use]
    pub fn training_time(&self) -> Duration {
        Duration::from_secs(u64::from(self.training_time_secs))
    }

    /// Label column name.
    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Training data location.
    #[must_use]
    pub fn csv_data_path(&self) -> &Path {
        &self.csv_data_path
    }

    /// Column name to inferred type.
    #[must_use]
    pub const fn column_mapping(&self) -> &BTreeMap<String, ColumnKind> {
        &self.column_mapping
    }

    /// Analysis thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &AnalysisThresholds {
        &self.thresholds
    }

    /// Numeric feature columns from the mapping, excluding the label, in name order.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_mapping
            .iter()
            .filter(|(name, kind)| kind.is_numeric() && *name != &self.label_column)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
