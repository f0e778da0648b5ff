//! Configuration layering tests.
//!
//! Tests that touch `ALLOT_*` variables are serialized because the process
//! environment is shared between test threads.

use std::env;
use std::fs;
use std::path::Path;

use serial_test::serial;
use tempfile::TempDir;

use allot::config::{Config, ConfigBuilder, OutputFormat};
use allot::AllocationType;

const ENV_VARS: [&str; 9] = [
    "ALLOT_ORG",
    "ALLOT_BATCH_SIZE",
    "ALLOT_LOW_AVAILABILITY_THRESHOLD",
    "ALLOT_DISABLE_AUTOINIT",
    "ALLOT_MAXIMUM_LOCK_WAIT_SECONDS",
    "ALLOT_OUTPUT_FORMAT",
    "ALLOT_FLOOR_AT_ZERO",
    "ALLOT_DEFAULT_QUANTITY",
    "ALLOT_CURRENCY",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Builds from `project` with an isolated user data directory.
fn build(project: &Path, data: &Path) -> allot::Result<Config> {
    ConfigBuilder::new()
        .with_working_dir(project)
        .with_data_dir(data)
        .build()
}

#[test]
#[serial]
fn test_full_precedence_chain() {
    clear_env();
    let data = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    write(
        data.path(),
        "config.yaml",
        "org: user\nbatch_size: 10\nlow_availability_threshold_percent: 5\noutput_format: csv\n",
    );
    write(project.path(), "allot.yaml", "org: project\nbatch_size: 20\n");
    write(project.path(), "allot.local.yaml", "batch_size: 30\n");
    env::set_var("ALLOT_ORG", "environment");

    let config = build(project.path(), data.path());
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.org.as_deref(), Some("environment"));
    assert_eq!(config.batch_size(), 30);
    assert!((config.low_threshold_percent() - 5.0).abs() < f64::EPSILON);
    assert_eq!(config.output_format, Some(OutputFormat::Csv));
}

#[test]
#[serial]
fn test_generation_section_layers_field_by_field() {
    clear_env();
    let data = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    write(
        data.path(),
        "config.yaml",
        "generation:\n  default_quantity: 8\n  allocation_type: on_request\n",
    );
    write(project.path(), "allot.yaml", "generation:\n  currency: GBP\n");
    env::set_var("ALLOT_DEFAULT_QUANTITY", "15");

    let config = build(project.path(), data.path());
    clear_env();
    let generation = config.unwrap().generation.unwrap();

    assert_eq!(generation.default_quantity, Some(15));
    assert_eq!(generation.allocation_type, Some(AllocationType::OnRequest));
    assert_eq!(generation.currency.unwrap().as_str(), "GBP");
}

#[test]
#[serial]
fn test_unknown_key_in_project_file_rejected() {
    clear_env();
    let data = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(project.path(), "allot.yaml", "batchsize: 10\n");

    assert!(build(project.path(), data.path()).is_err());
}

#[test]
#[serial]
fn test_invalid_env_value_rejected() {
    clear_env();
    let data = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    env::set_var("ALLOT_FLOOR_AT_ZERO", "sometimes");

    let result = build(project.path(), data.path());
    clear_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_validation_runs_after_merge() {
    clear_env();
    let data = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(project.path(), "allot.yaml", "batch_size: 0\n");

    match build(project.path(), data.path()) {
        Err(allot::Error::Validation { field, .. }) => assert_eq!(field, "batch_size"),
        other => panic!("expected validation error, got {other:?}"),
    }
}
