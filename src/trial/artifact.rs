//! Trained model location

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where the engine saved the model a trial trained.
///
/// The monitor never opens the file. The winner's location ends up in the
/// run summary so the caller can load it for the analysis passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelArtifact {
    trial_id: u64,
    path: PathBuf,
}

impl ModelArtifact {
    /// Model of `trial_id`, saved at `path`.
    #[must_use]
    pub fn new(trial_id: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            trial_id,
            path: path.into(),
        }
    }

    /// Trial that trained the model.
    #[must_use]
    pub const fn trial_id(&self) -> u64 {
        self.trial_id
    }

    /// Saved model file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
