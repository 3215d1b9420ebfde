//! Search pipeline definition and trainer resolution
//!
//! The engine describes a trial's pipeline only through a `*`-separated
//! schema string buried in the parameter bag. This module owns that
//! stringly-typed protocol so nothing else has to parse it:
//!
//! ```text
//! SearchPipeline ──build──> EstimatorCatalog (stage name -> estimator type)
//!                                  │
//! TrialSettings ──TrainerResolver──┴──> TrainerIdentity
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vigia::pipeline::{resolve_trainer, EstimatorCatalog, SearchPipeline};
//! use vigia::trial::TrialSettings;
//!
//! let pipeline = SearchPipeline::new()
//!     .stage("Concat", "Concatenate")
//!     .stage("Normalize", "NormalizeMinMax")
//!     .stage("LightGbm", "LightGbmBinary");
//! let catalog = EstimatorCatalog::from_pipeline(&pipeline)?;
//!
//! let settings = TrialSettings::builder(1)
//!     .pipeline_schema("Concat*Normalize*LightGbm")
//!     .build();
//! let trainer = resolve_trainer(&settings, &catalog)?;
//! assert_eq!(trainer.estimator_type().as_str(), "LightGbmBinary");
//! # Ok::<(), vigia::Error>(())
//! ```

mod catalog;
mod resolver;

pub use catalog::{EstimatorCatalog, EstimatorType, PipelineStage, SearchPipeline, TrainerIdentity};
pub use resolver::{
    active_stage, resolve_trainer, SchemaStringResolver, SelectedStageResolver, TrainerResolver,
    SCHEMA_DELIMITER,
};
