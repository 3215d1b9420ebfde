//! # Vigia: AutoML Trial Monitoring and Feature Pruning
//!
//! **Version**: 0.1.0
//!
//! Vigia watches an AutoML search run and helps decide what to keep from it.
//! It does not search, sample, or train anything itself: the search engine
//! calls into a [`TrialMonitor`](monitor::TrialMonitor) as trials run, and
//! once the winning model is trained the [`analysis`] passes rank the input
//! features.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Genchi Genbutsu**: Every completed trial is kept, not just the winner
//! - **Jidoka**: Schema/catalog mismatches surface as errors, never as a
//!   silently wrong trainer name
//! - **Poka-Yoke**: Single-writer monitor state is enforced by `&mut self`;
//!   concurrent engines go through [`SharedMonitor`](monitor::SharedMonitor)
//! - **Muda elimination**: Feature pairs and low-impact features are flagged
//!   so they can be dropped from the next run
//!
//! ## Example Usage
//!
//! ```rust
//! use vigia::analysis::{CorrelationReport, ImportanceReport, NumericColumn, NumericColumns};
//! use vigia::analysis::{MetricStatistics, PermutationStatistics};
//! use vigia::config::{AnalysisThresholds, MetricKind};
//! use vigia::monitor::{TrialMonitor, TrialObserver};
//! use vigia::pipeline::SearchPipeline;
//! use vigia::trial::{TrialResult, TrialSettings};
//!
//! // Observe the search
//! let pipeline = SearchPipeline::new()
//!     .stage("e0", "FeaturizeText")
//!     .stage("e1", "SdcaMaximumEntropyMulti");
//! let mut monitor = TrialMonitor::builder(&pipeline)
//!     .metric(MetricKind::MicroAccuracy)
//!     .build()?;
//!
//! let settings = TrialSettings::builder(0).pipeline_schema("e0*e1").build();
//! let result = TrialResult::new(settings, 0.93, 0.07, 812.0);
//! monitor.on_trial_completed(result.clone());
//! monitor.on_trial_best(result.clone());
//! println!("{}", monitor.summarize(&result)?);
//!
//! // Rank features of the trained model
//! let stats = |mean| PermutationStatistics::new()
//!     .with(MetricKind::MicroAccuracy, MetricStatistics::new(mean, 0.001));
//! let slots = vec![
//!     ("Title.0".to_string(), stats(0.12)),
//!     ("Title.1".to_string(), stats(0.08)),
//!     ("Length".to_string(), stats(0.002)),
//! ];
//! let importance = ImportanceReport::build(
//!     &slots,
//!     MetricKind::MicroAccuracy,
//!     &AnalysisThresholds::default(),
//! )?;
//! assert_eq!(importance.candidates().count(), 1);
//!
//! // Find redundant numeric inputs
//! let columns = NumericColumns::new(vec![
//!     NumericColumn::new("Length", vec![10.0, 20.0, 30.0]),
//!     NumericColumn::new("Words", vec![2.0, 4.0, 6.5]),
//! ]);
//! let correlation = CorrelationReport::build(&columns, 0.9)?;
//! assert_eq!(correlation.pairs().len(), 1);
//! # Ok::<(), vigia::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod pipeline;
pub mod trial;

pub use error::{Error, Result};
