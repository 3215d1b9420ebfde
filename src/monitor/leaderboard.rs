//! Ranked trial views and the end-of-run summary

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::MetricKind;
use crate::pipeline::{EstimatorCatalog, TrainerIdentity, TrainerResolver};
use crate::trial::{ModelArtifact, TrialResult};

/// Trainer column of a leaderboard row.
///
/// Resolution failures stay local to their row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TrainerLabel {
    /// Trainer resolved from the trial settings.
    Resolved(TrainerIdentity),
    /// Resolution failed; carries the error message.
    Unresolved(String),
}

impl fmt::Display for TrainerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(trainer) => fmt::Display::fmt(trainer, f),
            Self::Unresolved(_) => f.write_str("<unresolved>"),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// Trial ID.
    pub trial_id: u64,
    /// Trainer used by the trial.
    pub trainer: TrainerLabel,
    /// Ranking metric score.
    pub metric: f64,
    /// Loss.
    pub loss: f64,
    /// Training time in milliseconds.
    pub duration_ms: f64,
}

/// Trials ranked by descending metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Rank `trials`, resolving each trainer independently.
    ///
    /// Ties keep their insertion order. NaN metrics rank last.
    #[must_use]
    pub fn rank(
        trials: &[TrialResult],
        catalog: &EstimatorCatalog,
        resolver: &dyn TrainerResolver,
    ) -> Self {
        let mut entries: Vec<LeaderboardEntry> = trials
            .iter()
            .map(|trial| LeaderboardEntry {
                trial_id: trial.trial_id(),
                trainer: match resolver.resolve(trial.settings(), catalog) {
                    Ok(trainer) => TrainerLabel::Resolved(trainer),
                    Err(e) => TrainerLabel::Unresolved(e.to_string()),
                },
                metric: trial.metric(),
                loss: trial.loss(),
                duration_ms: trial.duration_ms(),
            })
            .collect();

        entries.sort_by(|a, b| descending(a.metric, b.metric));
        Self { entries }
    }

    /// Rows, best first.
    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render one line per row.
    #[must_use]
    pub fn render(&self, metric: MetricKind) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    " {metric}: {:<6.3}   Loss: {:<6.3}   Training time: {:>5.0} ms   Trainer: {}",
                    e.metric, e.loss, e.duration_ms, e.trainer
                )
            })
            .collect()
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    let key = |m: f64| if m.is_nan() { f64::NEG_INFINITY } else { m };
    key(b).total_cmp(&key(a))
}

/// Highest resource usage seen across completed trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResourcePeaks {
    /// Peak CPU fraction.
    pub cpu: Option<f64>,
    /// Peak memory in megabytes.
    pub memory_mb: Option<f64>,
}

impl ResourcePeaks {
    /// Fold one trial's peaks in. Values only ever increase.
    pub fn observe(&mut self, cpu: Option<f64>, memory_mb: Option<f64>) {
        raise(&mut self.cpu, cpu);
        raise(&mut self.memory_mb, memory_mb);
    }
}

fn raise(peak: &mut Option<f64>, value: Option<f64>) {
    if let Some(value) = value {
        if value > peak.unwrap_or(f64::NEG_INFINITY) {
            *peak = Some(value);
        }
    }
}

/// End-of-run summary for the winning trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Winning trainer.
    pub trainer: TrainerIdentity,
    /// Metric the summary's score refers to.
    pub metric_kind: MetricKind,
    /// Winning score.
    pub metric: f64,
    /// Winning trial's training time in milliseconds.
    pub duration_ms: f64,
    /// Resource peaks over the whole run.
    pub peaks: ResourcePeaks,
    /// Wall-clock length of the run.
    pub elapsed: Duration,
    /// Saved model of the winning trial, if the engine reported one.
    pub model: Option<ModelArtifact>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " Best trainer: {}", self.trainer)?;
        write!(
            f,
            " {}: {:<6.3}   Training time: {:>5.0} ms",
            self.metric_kind, self.metric, self.duration_ms
        )?;
        match self.peaks.cpu {
            Some(cpu) => write!(f, "   CPU: {:>5.2}%", cpu * 100.0)?,
            None => write!(f, "   CPU: n/a")?,
        }
        match self.peaks.memory_mb {
            Some(memory) => write!(f, "   Memory: {memory:>5.2}MB")?,
            None => write!(f, "   Memory: n/a")?,
        }
        if let Some(model) = &self.model {
            write!(f, "\n Model: {}", model.path().display())?;
        }
        Ok(())
    }
}
