//! Post-hoc feature analysis
//!
//! Two independent, side-effect-free passes that help prune a trained model:
//!
//! - [`importance`]: merges permutation-importance statistics of vectorized
//!   feature slots back into their source features and flags the ones whose
//!   impact is too small to keep.
//! - [`correlation`]: Pearson correlation matrix over the numeric training
//!   columns, flagging redundant pairs.

pub mod correlation;
pub mod importance;

pub use correlation::{
    correlation_matrix, flag_pairs, pearson, CorrelatedPair, CorrelationMatrix,
    CorrelationReport, NumericColumn, NumericColumns,
};
pub use importance::{
    aggregate, check_slot_count, logical_feature, select_metric, FeatureImportance,
    ImportanceReport, MetricStatistics, PermutationStatistics, SLOT_SEPARATOR,
};
