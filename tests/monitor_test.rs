//! Trial monitor integration tests
//!
//! Drives a monitor the way a search engine does: running, completed, best
//! and failed callbacks interleaved, then reads the leaderboards and summary.

use vigia::config::{MetricKind, Scenario, TrainerSettings};
use vigia::monitor::{MonitorPhase, SharedMonitor, TrainerLabel, TrialMonitor, TrialObserver};
use vigia::pipeline::{SearchPipeline, SelectedStageResolver};
use vigia::trial::{FailureKind, ModelArtifact, TrialResult, TrialSettings};
use vigia::Error;

fn pipeline() -> SearchPipeline {
    SearchPipeline::new()
        .stage("Concat", "Concatenate")
        .stage("Normalize", "NormalizeMinMax")
        .stage("LightGbm", "LightGbmBinary")
        .stage("FastTree", "FastTreeBinary")
        .stage("Lbfgs", "LbfgsLogisticRegressionBinary")
}

fn trial(id: u64, trainer: &str, metric: f64) -> TrialResult {
    let settings = TrialSettings::builder(id)
        .pipeline_schema(format!("Concat*Normalize*{trainer}"))
        .build();
    TrialResult::new(settings, metric, 1.0 - metric, 100.0 * (id as f64 + 1.0))
}

// =============================================================================
// Accumulation
// =============================================================================

#[test]
fn test_completed_and_best_lists_keep_insertion_order() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();

    let t0 = trial(0, "FastTree", 0.71);
    let t1 = trial(1, "LightGbm", 0.84);
    let t2 = trial(2, "Lbfgs", 0.62);

    monitor.on_trial_completed(t0.clone());
    monitor.on_trial_best(t0.clone());
    monitor.on_trial_completed(t1.clone());
    monitor.on_trial_best(t1.clone());
    monitor.on_trial_completed(t2.clone());

    let completed: Vec<u64> = monitor.completed_trials().iter().map(TrialResult::trial_id).collect();
    let best: Vec<u64> = monitor.best_trials().iter().map(TrialResult::trial_id).collect();
    assert_eq!(completed, vec![0, 1, 2]);
    assert_eq!(best, vec![0, 1]);
}

#[test]
fn test_best_trials_not_deduplicated() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    let t = trial(4, "LightGbm", 0.9);
    for _ in 0..3 {
        monitor.on_trial_best(t.clone());
    }
    assert_eq!(monitor.best_trials().len(), 3);
}

#[test]
fn test_snapshots_are_idempotent() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    monitor.on_trial_completed(trial(0, "FastTree", 0.5));
    monitor.on_trial_best(trial(0, "FastTree", 0.5));

    assert_eq!(monitor.completed_trials(), monitor.completed_trials());
    let first = monitor.best_trials().to_vec();
    let second = monitor.best_trials().to_vec();
    assert_eq!(first, second);
}

#[test]
fn test_best_reported_before_completed_is_accepted() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    let t = trial(9, "FastTree", 0.8);
    monitor.on_trial_best(t.clone());
    monitor.on_trial_completed(t);
    assert_eq!(monitor.best_trials().len(), 1);
    assert_eq!(monitor.completed_trials().len(), 1);
}

// =============================================================================
// Resource peaks
// =============================================================================

#[test]
fn test_peaks_are_maxima_of_reported_values() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    assert_eq!(monitor.peaks().cpu, None);
    assert_eq!(monitor.peaks().memory_mb, None);

    let settings = |id| TrialSettings::builder(id).pipeline_schema("LightGbm").build();
    monitor.on_trial_completed(
        TrialResult::builder(settings(0), 0.5, 0.5, 1.0)
            .peak_cpu(0.35)
            .peak_memory_mb(120.0)
            .build(),
    );
    monitor.on_trial_completed(TrialResult::builder(settings(1), 0.5, 0.5, 1.0).peak_cpu(0.9).build());
    monitor.on_trial_completed(TrialResult::new(settings(2), 0.5, 0.5, 1.0));
    monitor.on_trial_completed(
        TrialResult::builder(settings(3), 0.5, 0.5, 1.0)
            .peak_cpu(0.1)
            .peak_memory_mb(480.5)
            .build(),
    );

    assert_eq!(monitor.peaks().cpu, Some(0.9));
    assert_eq!(monitor.peaks().memory_mb, Some(480.5));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_failure_classification() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    let settings = TrialSettings::builder(3).pipeline_schema("Concat*FastTree").build();

    assert_eq!(
        monitor.on_trial_failed(&settings, "Operation was canceled."),
        FailureKind::BudgetExceeded
    );
    assert_eq!(
        monitor.on_trial_failed(&settings, "Training diverged"),
        FailureKind::GenericFailure
    );
    assert!(monitor.completed_trials().is_empty());
    assert!(monitor.best_trials().is_empty());
    assert_eq!(monitor.failures().budget_exceeded, 1);
    assert_eq!(monitor.failures().generic, 1);
}

#[test]
fn test_running_with_incomplete_settings_does_not_panic() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    monitor.on_trial_running(&TrialSettings::builder(0).build());
    assert_eq!(monitor.phase(), MonitorPhase::Running);
}

// =============================================================================
// Leaderboards and final result
// =============================================================================

#[test]
fn test_leaderboard_ranks_descending() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    monitor.on_trial_completed(trial(0, "FastTree", 0.71));
    monitor.on_trial_completed(trial(1, "LightGbm", 0.84));
    monitor.on_trial_completed(trial(2, "Lbfgs", 0.62));

    let board = monitor.completed_leaderboard();
    let metrics: Vec<f64> = board.entries().iter().map(|e| e.metric).collect();
    assert_eq!(metrics, vec![0.84, 0.71, 0.62]);

    let lines = board.render(monitor.metric());
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Trainer: LightGbmBinary"));
}

#[test]
fn test_leaderboard_survives_unknown_stage() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    monitor.on_trial_completed(trial(0, "Sdca", 0.9));
    monitor.on_trial_completed(trial(1, "FastTree", 0.8));

    let board = monitor.completed_leaderboard();
    assert_eq!(board.len(), 2);
    match &board.entries()[0].trainer {
        TrainerLabel::Unresolved(reason) => assert!(reason.contains("Sdca")),
        other => panic!("expected unresolved trainer, got {other:?}"),
    }
}

#[test]
fn test_final_best_trainer_resolves_and_finishes() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    let best = trial(1, "LightGbm", 0.84);
    monitor.on_trial_completed(best.clone());
    monitor.on_trial_best(best.clone());

    let trainer = monitor.final_best_trainer(&best).unwrap();
    assert_eq!(trainer.stage(), "LightGbm");
    assert_eq!(trainer.estimator_type().as_str(), "LightGbmBinary");
    assert_eq!(monitor.phase(), MonitorPhase::Finished);
}

#[test]
fn test_final_best_trainer_surfaces_schema_errors() {
    let mut monitor = TrialMonitor::new(&pipeline()).unwrap();
    let bad = TrialResult::new(TrialSettings::builder(5).build(), 0.5, 0.5, 1.0);
    assert!(matches!(
        monitor.final_best_trainer(&bad),
        Err(Error::SchemaMissing { trial_id: 5, .. })
    ));
}

#[test]
fn test_summary_from_settings() {
    let settings = TrainerSettings::new(Scenario::BinaryClassification, 60, "Label", "data.csv");
    let mut monitor = TrialMonitor::builder(&pipeline())
        .settings(&settings)
        .build()
        .unwrap();
    assert_eq!(monitor.metric(), MetricKind::Accuracy);

    let best = TrialResult::builder(
        TrialSettings::builder(2).pipeline_schema("Concat*FastTree").build(),
        0.88,
        0.12,
        2400.0,
    )
    .peak_cpu(0.5)
    .peak_memory_mb(256.0)
    .model(ModelArtifact::new(2, "runs/2/model.zip"))
    .build();
    monitor.on_trial_completed(best.clone());

    let summary = monitor.summarize(&best).unwrap();
    let text = summary.to_string();
    assert!(text.contains("Best trainer: FastTreeBinary"));
    assert!(text.contains("Accuracy: 0.880"));
    assert!(text.contains("CPU: 50.00%"));
    assert!(text.contains("Memory: 256.00MB"));
    assert!(text.ends_with("Model: runs/2/model.zip"));
    assert_eq!(summary.model.map(|m| m.trial_id()), Some(2));
}

#[test]
fn test_typed_stage_resolver() {
    let mut monitor = TrialMonitor::builder(&pipeline())
        .resolver(SelectedStageResolver)
        .build()
        .unwrap();
    let settings = TrialSettings::builder(0).selected_stage("Lbfgs").build();
    let result = TrialResult::new(settings, 0.7, 0.3, 10.0);
    monitor.on_trial_completed(result.clone());
    assert_eq!(
        monitor.final_best_trainer(&result).unwrap().to_string(),
        "LbfgsLogisticRegressionBinary"
    );
}

// =============================================================================
// Shared monitor
// =============================================================================

#[test]
fn test_shared_monitor_as_observer() {
    let shared = SharedMonitor::new(TrialMonitor::new(&pipeline()).unwrap());
    let mut observer = shared.clone();
    let t = trial(0, "FastTree", 0.6);

    observer.on_trial_running(t.settings());
    observer.on_trial_completed(t.clone());
    observer.on_trial_best(t);

    assert_eq!(shared.completed_trials().len(), 1);
    assert_eq!(shared.best_trials().len(), 1);
    assert_eq!(shared.with(|m| m.phase()), MonitorPhase::Running);
}
