//! Trainer resolution from trial settings

use crate::trial::{TrialSettings, PIPELINE_KEY, SCHEMA_KEY};
use crate::{Error, Result};

use super::{EstimatorCatalog, TrainerIdentity};

/// Separator between stage names in a pipeline schema string.
pub const SCHEMA_DELIMITER: char = '*';

/// Recovers the trainer a trial used.
///
/// Implementations must be pure lookups: no logging, no caching.
pub trait TrainerResolver: Send + Sync {
    /// Resolve the trainer of `settings` against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `Error::SchemaMissing` when the settings do not say which stage
    /// ran and `Error::UnknownStage` when the catalog does not know it.
    fn resolve(&self, settings: &TrialSettings, catalog: &EstimatorCatalog)
        -> Result<TrainerIdentity>;
}

/// Parses `_pipeline_._SCHEMA_` and takes the last stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaStringResolver;

impl TrainerResolver for SchemaStringResolver {
    fn resolve(
        &self,
        settings: &TrialSettings,
        catalog: &EstimatorCatalog,
    ) -> Result<TrainerIdentity> {
        let schema = pipeline_schema(settings)?;
        let stage = active_stage(schema).ok_or_else(|| Error::SchemaMissing {
            trial_id: settings.trial_id(),
            reason: format!("schema string '{schema}' names no stage"),
        })?;
        lookup(settings.trial_id(), stage, catalog)
    }
}

/// Uses the typed `selected_stage` field, falling back to the schema string
/// for engines that leave it unset or blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectedStageResolver;

impl TrainerResolver for SelectedStageResolver {
    fn resolve(
        &self,
        settings: &TrialSettings,
        catalog: &EstimatorCatalog,
    ) -> Result<TrainerIdentity> {
        match settings
            .selected_stage()
            .map(str::trim)
            .filter(|stage| !stage.is_empty())
        {
            Some(stage) => lookup(settings.trial_id(), stage, catalog),
            None => SchemaStringResolver.resolve(settings, catalog),
        }
    }
}

/// Resolve with the schema-string protocol.
///
/// # Errors
///
/// See [`TrainerResolver::resolve`].
pub fn resolve_trainer(
    settings: &TrialSettings,
    catalog: &EstimatorCatalog,
) -> Result<TrainerIdentity> {
    SchemaStringResolver.resolve(settings, catalog)
}

/// Last non-empty, trimmed stage of a schema string.
///
/// ```rust
/// use vigia::pipeline::active_stage;
///
/// assert_eq!(active_stage("Concat * Normalize *LightGbm "), Some("LightGbm"));
/// assert_eq!(active_stage("Concat**"), Some("Concat"));
/// assert_eq!(active_stage(" * "), None);
/// ```
#[must_use]
pub fn active_stage(schema: &str) -> Option<&str> {
    schema
        .split(SCHEMA_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .last()
}

fn pipeline_schema(settings: &TrialSettings) -> Result<&str> {
    let missing = |reason: &str| Error::SchemaMissing {
        trial_id: settings.trial_id(),
        reason: reason.to_string(),
    };

    let pipeline = settings
        .parameter(PIPELINE_KEY)
        .ok_or_else(|| missing("no '_pipeline_' parameter"))?;
    let schema = pipeline
        .get(SCHEMA_KEY)
        .ok_or_else(|| missing("'_pipeline_' has no '_SCHEMA_' entry"))?;
    schema
        .as_str()
        .ok_or_else(|| missing("'_SCHEMA_' is not a string"))
}

fn lookup(trial_id: u64, stage: &str, catalog: &EstimatorCatalog) -> Result<TrainerIdentity> {
    catalog
        .get(stage)
        .map(|estimator_type| TrainerIdentity::new(stage, estimator_type.clone()))
        .ok_or_else(|| Error::UnknownStage {
            trial_id,
            stage: stage.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SearchPipeline;
    use serde_json::json;

    fn catalog() -> EstimatorCatalog {
        let pipeline = SearchPipeline::new()
            .stage("Concat", "Concatenate")
            .stage("Normalize", "NormalizeMinMax")
            .stage("LightGbm", "LightGbmMulti")
            .stage("FastTree", "FastTreeOva");
        EstimatorCatalog::from_pipeline(&pipeline).unwrap()
    }

    #[test]
    fn test_resolves_last_stage() {
        let settings = TrialSettings::builder(1)
            .pipeline_schema("Concat*Normalize*LightGbm")
            .build();
        let trainer = resolve_trainer(&settings, &catalog()).unwrap();
        assert_eq!(trainer.stage(), "LightGbm");
        assert_eq!(trainer.estimator_type().as_str(), "LightGbmMulti");
    }

    #[test]
    fn test_missing_pipeline() {
        let settings = TrialSettings::builder(2).build();
        let err = resolve_trainer(&settings, &catalog()).unwrap_err();
        assert!(matches!(err, Error::SchemaMissing { trial_id: 2, .. }));
    }

    #[test]
    fn test_missing_schema_entry() {
        let settings = TrialSettings::builder(3)
            .parameter(PIPELINE_KEY, json!({ "e0": {} }))
            .build();
        assert!(matches!(
            resolve_trainer(&settings, &catalog()),
            Err(Error::SchemaMissing { .. })
        ));
    }

    #[test]
    fn test_non_string_schema() {
        let settings = TrialSettings::builder(4)
            .parameter(PIPELINE_KEY, json!({ "_SCHEMA_": 17 }))
            .build();
        assert!(matches!(
            resolve_trainer(&settings, &catalog()),
            Err(Error::SchemaMissing { .. })
        ));
    }

    #[test]
    fn test_empty_schema() {
        let settings = TrialSettings::builder(5).pipeline_schema(" * ").build();
        assert!(matches!(
            resolve_trainer(&settings, &catalog()),
            Err(Error::SchemaMissing { .. })
        ));
    }

    #[test]
    fn test_unknown_stage() {
        let settings = TrialSettings::builder(6)
            .pipeline_schema("Concat*Sdca")
            .build();
        let err = resolve_trainer(&settings, &catalog()).unwrap_err();
        match err {
            Error::UnknownStage { trial_id, stage } => {
                assert_eq!(trial_id, 6);
                assert_eq!(stage, "Sdca");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_selected_stage_preferred() {
        let settings = TrialSettings::builder(7)
            .pipeline_schema("Concat*LightGbm")
            .selected_stage("FastTree")
            .build();
        let trainer = SelectedStageResolver.resolve(&settings, &catalog()).unwrap();
        assert_eq!(trainer.stage(), "FastTree");
    }

    #[test]
    fn test_selected_stage_falls_back_to_schema() {
        let settings = TrialSettings::builder(8)
            .pipeline_schema("Concat*LightGbm")
            .build();
        let trainer = SelectedStageResolver.resolve(&settings, &catalog()).unwrap();
        assert_eq!(trainer.stage(), "LightGbm");
    }

    #[test]
    fn test_selected_stage_is_trimmed() {
        let settings = TrialSettings::builder(9)
            .pipeline_schema("Concat*FastTree")
            .selected_stage(" LightGbm ")
            .build();
        let trainer = SelectedStageResolver.resolve(&settings, &catalog()).unwrap();
        assert_eq!(trainer.stage(), "LightGbm");
        assert_eq!(trainer.estimator_type().as_str(), "LightGbmMulti");
    }

    #[test]
    fn test_blank_selected_stage_falls_back_to_schema() {
        for blank in ["", "   "] {
            let settings = TrialSettings::builder(10)
                .pipeline_schema("Concat*LightGbm")
                .selected_stage(blank)
                .build();
            let trainer = SelectedStageResolver.resolve(&settings, &catalog()).unwrap();
            assert_eq!(trainer.stage(), "LightGbm");
        }
    }
}
