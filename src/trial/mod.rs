//! Trial data model
//!
//! These are the records the external search engine hands to the monitor.
//! They are produced by the engine and never mutated afterwards.
//!
//! ## Schema Overview
//!
//! ```text
//! TrialSettings (1) ──< TrialResult (0..1)
//!                           │
//!                           └── ModelArtifact (0..1)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vigia::trial::{FailureKind, TrialResult, TrialSettings};
//!
//! let settings = TrialSettings::builder(7)
//!     .pipeline_schema("ReplaceMissingValues*Concat*FastTree")
//!     .build();
//!
//! let result = TrialResult::builder(settings, 0.91, 0.09, 1250.0)
//!     .peak_cpu(0.75)
//!     .build();
//! assert_eq!(result.trial_id(), 7);
//!
//! assert_eq!(
//!     FailureKind::classify("Operation was canceled."),
//!     FailureKind::BudgetExceeded
//! );
//! ```

mod artifact;
mod failure;
mod result;
mod settings;

pub use artifact::ModelArtifact;
pub use failure::{FailureKind, CANCELLATION_MARKER};
pub use result::{TrialResult, TrialResultBuilder};
pub use settings::{TrialSettings, TrialSettingsBuilder, PIPELINE_KEY, SCHEMA_KEY};
