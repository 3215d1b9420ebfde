//! Failed trial classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker the engine puts in the error text of trials it cancels when the
/// time budget runs out.
pub const CANCELLATION_MARKER: &str = "Operation was canceled.";

/// Why a trial did not complete.
///
/// Classification is a substring match over the engine's error text, so it is
/// best-effort: an engine that rewords its cancellation message will see
/// budget cancellations reported as generic failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Cancelled because the search time budget was exhausted.
    BudgetExceeded,
    /// Any other error.
    GenericFailure,
}

impl FailureKind {
    /// Classify an engine error message.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        if message.contains(CANCELLATION_MARKER) {
            Self::BudgetExceeded
        } else {
            Self::GenericFailure
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExceeded => f.write_str("time budget exceeded"),
            Self::GenericFailure => f.write_str("failed"),
        }
    }
}
