//! Settings file tests

use std::io::Write;

use vigia::config::{AnalysisThresholds, ColumnKind, Scenario, TrainerSettings};
use vigia::Error;

const SETTINGS: &str = r#"{
    "scenario": "MulticlassClassification",
    "training_time_secs": 120,
    "label_column": "Species",
    "csv_data_path": "data/iris.csv",
    "column_mapping": {
        "SepalLength": "Single",
        "SepalWidth": "Single",
        "Species": "String"
    },
    "thresholds": { "importance_deletion": 0.02 }
}"#;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SETTINGS.as_bytes()).unwrap();

    let settings = TrainerSettings::from_json_file(file.path()).unwrap();
    assert_eq!(settings.scenario(), Scenario::MulticlassClassification);
    assert_eq!(settings.label_column(), "Species");
    assert_eq!(settings.column_mapping()["Species"], ColumnKind::String);
    assert_eq!(settings.numeric_columns(), vec!["SepalLength", "SepalWidth"]);

    // Unset thresholds keep their defaults
    let thresholds = settings.thresholds();
    assert!((thresholds.importance_deletion - 0.02).abs() < f64::EPSILON);
    assert!((thresholds.correlation - AnalysisThresholds::default().correlation).abs() < f64::EPSILON);
    assert_eq!(thresholds.max_importance_slots, 20);
}

#[test]
fn test_load_sample_trainer_file() {
    let json = r#"{
        "Scenario": "Regression",
        "TrainingTime": 60,
        "LabelColumn": "price",
        "CsvDataPath": "d.csv",
        "ColumnMapping": {
            "rooms": "Double",
            "floors": "UInt32",
            "built": "DateTime",
            "city": "String"
        }
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let settings = TrainerSettings::from_json_file(file.path()).unwrap();
    assert_eq!(settings.scenario(), Scenario::Regression);
    assert_eq!(settings.training_time().as_secs(), 60);
    assert_eq!(settings.label_column(), "price");
    assert_eq!(settings.column_mapping()["rooms"], ColumnKind::Double);
    assert_eq!(settings.numeric_columns(), vec!["floors", "rooms"]);
    assert_eq!(settings.thresholds(), &AnalysisThresholds::default());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = TrainerSettings::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        TrainerSettings::from_json_str("{ \"scenario\": "),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_unknown_scenario_rejected() {
    let json = SETTINGS.replace("MulticlassClassification", "Ranking");
    assert!(matches!(TrainerSettings::from_json_str(&json), Err(Error::Json(_))));
}

#[test]
fn test_out_of_range_correlation_threshold() {
    let json = SETTINGS.replace(
        "\"importance_deletion\": 0.02",
        "\"correlation\": 1.5",
    );
    assert!(matches!(TrainerSettings::from_json_str(&json), Err(Error::Config(_))));
}

#[test]
fn test_settings_round_trip() {
    let settings = TrainerSettings::from_json_str(SETTINGS).unwrap();
    let json = serde_json::to_string(&settings).unwrap();
    assert_eq!(TrainerSettings::from_json_str(&json).unwrap(), settings);
}
