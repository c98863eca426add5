//! Test: Configuration Errors - detected before anything runs

use crate::helpers::*;
use simrun::core::config::{ConfigError, ExperimentConfig};

#[test]
fn test_missing_weights_file_key() {
    let workspace = Workspace::new();
    let yaml = workspace
        .config_yaml(&standard_stages(true, true, true, true))
        .replace("    WEIGHTS_FILE: \"weights10000.txt\"\n", "");

    let err = ExperimentConfig::from_yaml(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("WEIGHTS_FILE"), "{}", err);
}

#[test]
fn test_missing_precision() {
    let workspace = Workspace::new();
    let yaml = workspace
        .config_yaml(&standard_stages(true, true, true, true))
        .replace("precision:\n  exponent_width: 8\n  significand_width: 7\n", "");

    assert!(ExperimentConfig::from_yaml(&yaml).is_err());
}

#[test]
fn test_degenerate_precision() {
    let workspace = Workspace::new();
    let yaml = workspace
        .config_yaml(&standard_stages(true, true, true, true))
        .replace("exponent_width: 8", "exponent_width: 1")
        .replace("significand_width: 7", "significand_width: 1");

    let err = ExperimentConfig::from_yaml(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_valid_config_round_trips_through_validation() {
    let workspace = Workspace::new();
    let config = ExperimentConfig::from_yaml(&workspace.config_yaml(&standard_stages(true, true, true, true)))
        .unwrap();
    assert_eq!(config.working_dir(), workspace.program_dir());
    assert!(config.validate().is_ok());
}
