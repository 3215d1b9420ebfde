//! Permutation feature importance aggregation
//!
//! Vectorizing featurizers (one-hot encoding, text n-grams) expand one source
//! column into many slots named `<feature>.<index>`. Permutation importance is
//! measured per slot, so the slots of one feature are merged back:
//!
//! ```text
//! merged mean = Σ slot means
//! merged SE   = Σ slot standard errors
//! ```
//!
//! The standard errors are summed rather than combined in quadrature. That is
//! an upper bound that ignores any correlation between slots; downstream
//! thresholds were tuned against it, so it is kept.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::{AnalysisThresholds, MetricKind};
use crate::{Error, Result};

/// Separator between a source feature name and its slot index.
pub const SLOT_SEPARATOR: char = '.';

/// Multiplier applied to the standard error for the reported 95% band.
pub const BAND_FACTOR: f64 = 1.95;

/// Mean and standard error of one metric's change under permutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    /// Mean metric change.
    pub mean: f64,
    /// Standard error of the mean.
    pub standard_error: f64,
}

impl MetricStatistics {
    /// Create statistics.
    #[must_use]
    pub const fn new(mean: f64, standard_error: f64) -> Self {
        Self {
            mean,
            standard_error,
        }
    }
}

/// All metric statistics measured for one slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermutationStatistics {
    metrics: BTreeMap<MetricKind, MetricStatistics>,
}

impl PermutationStatistics {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one metric's statistics.
    #[must_use]
    pub fn with(mut self, metric: MetricKind, statistics: MetricStatistics) -> Self {
        self.metrics.insert(metric, statistics);
        self
    }

    /// Get one metric's statistics.
    #[must_use]
    pub fn get(&self, metric: MetricKind) -> Option<MetricStatistics> {
        self.metrics.get(&metric).copied()
    }
}

/// Importance of one source feature after merging its slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Source feature name.
    pub feature: String,
    /// Sum of slot means.
    pub mean: f64,
    /// Sum of slot standard errors.
    pub standard_error: f64,
    /// `|mean| < threshold`.
    pub is_deletion_candidate: bool,
    /// Number of slots merged.
    pub slots: usize,
}

/// Source feature of a slot name: everything before the first separator.
///
/// ```rust
/// use vigia::analysis::logical_feature;
///
/// assert_eq!(logical_feature("Color.3"), "Color");
/// assert_eq!(logical_feature("Text.ngram.12"), "Text");
/// assert_eq!(logical_feature("Age"), "Age");
/// ```
#[must_use]
pub fn logical_feature(slot: &str) -> &str {
    slot.split_once(SLOT_SEPARATOR)
        .map_or(slot, |(feature, _)| feature)
}

/// Merge slot statistics per source feature and rank ascending by mean.
///
/// Features keep first-appearance order among equal means. NaN means rank
/// last and are never deletion candidates.
///
/// # Errors
///
/// Returns `Error::DimensionMismatch` if a slot name appears twice and
/// `Error::InvalidInput` if the threshold is NaN. A negative threshold is
/// accepted and flags nothing.
///
/// # Example
///
/// ```rust
/// use vigia::analysis::{aggregate, MetricStatistics};
///
/// let slots = vec![
///     ("f1.0", MetricStatistics::new(0.2, 0.01)),
///     ("f1.1", MetricStatistics::new(0.3, 0.02)),
///     ("f2", MetricStatistics::new(0.05, 0.01)),
/// ];
/// let ranked = aggregate(slots, 0.1)?;
///
/// assert_eq!(ranked[0].feature, "f2");
/// assert!(ranked[0].is_deletion_candidate);
/// assert_eq!(ranked[1].feature, "f1");
/// assert!((ranked[1].mean - 0.5).abs() < 1e-12);
/// # Ok::<(), vigia::Error>(())
/// ```
pub fn aggregate<I, S>(slots: I, deletion_threshold: f64) -> Result<Vec<FeatureImportance>>
where
    I: IntoIterator<Item = (S, MetricStatistics)>,
    S: AsRef<str>,
{
    if deletion_threshold.is_nan() {
        return Err(Error::InvalidInput(
            "deletion threshold must be a number, got NaN".to_string(),
        ));
    }

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut merged: Vec<FeatureImportance> = Vec::new();

    for (slot, stats) in slots {
        let slot = slot.as_ref();
        if !seen.insert(slot.to_string()) {
            return Err(Error::DimensionMismatch {
                expected: "unique feature slot names".to_string(),
                actual: format!("slot '{slot}' reported twice"),
            });
        }

        let feature = logical_feature(slot);
        match index.get(feature).copied() {
            Some(i) => {
                let entry = &mut merged[i];
                entry.mean += stats.mean;
                entry.standard_error += stats.standard_error;
                entry.slots += 1;
            }
            None => {
                index.insert(feature.to_string(), merged.len());
                merged.push(FeatureImportance {
                    feature: feature.to_string(),
                    mean: stats.mean,
                    standard_error: stats.standard_error,
                    is_deletion_candidate: false,
                    slots: 1,
                });
            }
        }
    }

    let key = |m: f64| if m.is_nan() { f64::INFINITY } else { m };
    merged.sort_by(|a, b| key(a.mean).total_cmp(&key(b.mean)));
    for entry in &mut merged {
        entry.is_deletion_candidate = entry.mean.abs() < deletion_threshold;
    }

    Ok(merged)
}

/// Pick one metric out of per-slot permutation statistics.
///
/// # Errors
///
/// Returns `Error::MissingMetric` naming the first slot without `metric`.
pub fn select_metric<'a, I>(slots: I, metric: MetricKind) -> Result<Vec<(&'a str, MetricStatistics)>>
where
    I: IntoIterator<Item = (&'a str, &'a PermutationStatistics)>,
{
    slots
        .into_iter()
        .map(|(slot, stats)| {
            stats
                .get(metric)
                .map(|s| (slot, s))
                .ok_or_else(|| Error::MissingMetric {
                    metric: metric.to_string(),
                    slot: slot.to_string(),
                })
        })
        .collect()
}

/// Whether a feature's slot count is small enough for permutation importance.
///
/// Each slot is permuted and re-scored several times, so wide vectorized
/// features make the analysis crawl. Logs an error and returns `false` when
/// `slot_count` exceeds `max_slots`.
#[must_use]
pub fn check_slot_count(slot_count: usize, max_slots: usize) -> bool {
    if slot_count > max_slots {
        error!(
            slot_count,
            max_slots, "number of slots is too high, permutation importance will take very long"
        );
        return false;
    }
    true
}

/// Ranked importance of every source feature for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceReport {
    metric: MetricKind,
    threshold: f64,
    features: Vec<FeatureImportance>,
    oversized: Vec<String>,
}

impl ImportanceReport {
    /// Select `metric` from the raw slot statistics and aggregate it.
    ///
    /// Uses `thresholds.importance_deletion` for deletion candidates and runs
    /// [`check_slot_count`] against `thresholds.max_importance_slots` for
    /// every merged feature.
    ///
    /// # Errors
    ///
    /// As [`select_metric`] and [`aggregate`].
    pub fn build(
        slots: &[(String, PermutationStatistics)],
        metric: MetricKind,
        thresholds: &AnalysisThresholds,
    ) -> Result<Self> {
        let deletion_threshold = thresholds.importance_deletion;
        let selected = select_metric(slots.iter().map(|(s, p)| (s.as_str(), p)), metric)?;
        let features = aggregate(selected, deletion_threshold)?;

        let oversized = features
            .iter()
            .filter(|f| !check_slot_count(f.slots, thresholds.max_importance_slots))
            .map(|f| f.feature.clone())
            .collect();

        let candidates = features.iter().filter(|f| f.is_deletion_candidate).count();
        if candidates > 0 {
            warn!(
                %metric,
                candidates,
                threshold = deletion_threshold,
                "features below importance threshold"
            );
        }

        Ok(Self {
            metric,
            threshold: deletion_threshold,
            features,
            oversized,
        })
    }

    /// Metric the report aggregates.
    #[must_use]
    pub const fn metric(&self) -> MetricKind {
        self.metric
    }

    /// Deletion threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Features, lowest impact first.
    #[must_use]
    pub fn features(&self) -> &[FeatureImportance] {
        &self.features
    }

    /// Features flagged for deletion.
    pub fn candidates(&self) -> impl Iterator<Item = &FeatureImportance> {
        self.features.iter().filter(|f| f.is_deletion_candidate)
    }

    /// Features that expanded to more slots than the configured maximum.
    #[must_use]
    pub fn oversized(&self) -> &[String] {
        &self.oversized
    }

    /// Render the header and one numbered row per feature.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.features.len() + 1);
        lines.push(format!(
            "  {:>4} {:<15} {:>15} {:>15}",
            "No",
            "Feature",
            self.metric.to_string(),
            "95% Mean"
        ));
        for (n, f) in self.features.iter().enumerate() {
            let band = BAND_FACTOR * f.standard_error;
            let line = if f.is_deletion_candidate {
                format!(
                    "  {:>3}. {:<15} {:>15.5} {:>15.5} (candidate for deletion!)",
                    n + 1,
                    f.feature,
                    f.mean,
                    band
                )
            } else {
                format!(
                    "  {:>3}. {:<15} {:>15.4} {:>15.4}",
                    n + 1,
                    f.feature,
                    f.mean,
                    band
                )
            };
            lines.push(line);
        }
        lines
    }
}
