//! Integration tests for CLI commands.
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

mod common;
use common::{assert_flexmex_fails, assert_flexmex_runs, get_flexmex_stdout};

const EXAMPLE_NAME: &str = "two_regions";
const EXAMPLE_DIR: &str = "demos/two_regions";

fn scenario_path() -> String {
    Path::new(EXAMPLE_DIR)
        .join("scenario.toml")
        .to_string_lossy()
        .into_owned()
}

/// A path inside a fresh temporary directory, which does not exist yet
fn output_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("out")
}

/// Test the `preprocess` command
#[test]
fn check_preprocess_command() {
    // Save results to non-existent directory to check that directory creation works
    let tmp = tempdir().unwrap();
    let output_dir = output_dir(&tmp);
    assert_flexmex_runs(&[
        "preprocess",
        &scenario_path(),
        EXAMPLE_DIR,
        &output_dir.to_string_lossy(),
    ]);

    assert!(output_dir.join("datapackage.json").is_file());
    assert!(output_dir.join("metadata.toml").is_file());
    assert!(output_dir.join("flexmex_info.log").is_file());
    assert!(output_dir.join("data/elements/bus.csv").is_file());
}

/// A non-empty output directory is only replaced with `--overwrite`
#[test]
fn check_preprocess_command_overwrite() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("old.txt"), "old").unwrap();
    let output_dir = tmp.path().to_string_lossy();

    let args = ["preprocess", &scenario_path(), EXAMPLE_DIR, &output_dir];
    assert_flexmex_fails(&args);
    assert!(tmp.path().join("old.txt").exists());

    assert_flexmex_runs(&[&args[..], &["--overwrite"]].concat());
    assert!(!tmp.path().join("old.txt").exists());
}

/// Test the `validate` command
#[test]
fn check_validate_command() {
    assert_flexmex_runs(&["validate", &scenario_path(), EXAMPLE_DIR]);
}

/// Validation fails if the raw data cannot be found
#[test]
fn check_validate_command_missing_data() {
    let tmp = tempdir().unwrap();
    assert_flexmex_fails(&["validate", &scenario_path(), &tmp.path().to_string_lossy()]);
}

/// Test the `postprocess` command
#[test]
fn check_postprocess_command() {
    let tmp = tempdir().unwrap();
    let output_dir = output_dir(&tmp);
    let results_dir = Path::new(EXAMPLE_DIR).join("results");
    assert_flexmex_runs(&[
        "postprocess",
        &scenario_path(),
        &results_dir.to_string_lossy(),
        &output_dir.to_string_lossy(),
    ]);

    assert!(output_dir.join("Scalars.csv").is_file());
    assert!(output_dir.join("TimeSeries.csv").is_file());
}

/// Test the `components` command
#[test]
fn check_components_command() {
    let stdout = get_flexmex_stdout(&["components"]);
    let lines = stdout.lines().collect_vec();
    assert_eq!(lines.len(), 16);
    assert!(
        lines
            .iter()
            .any(|line| *line == "electricity-gt (conversion, ch4/electricity, expandable)")
    );
}

/// Test the `example list` command
#[test]
fn check_example_list_command() {
    let stdout = get_flexmex_stdout(&["example", "list"]);
    let lines = stdout.split('\n').collect_vec();
    assert!(lines.first().is_some_and(|s| !s.is_empty()));
    assert!(lines.last().is_some_and(|s| s.is_empty()));
}

/// Test the `example info` command
#[test]
fn check_example_info_command() {
    assert!(!get_flexmex_stdout(&["example", "info", EXAMPLE_NAME]).is_empty());
}

/// Test the `example extract` command
#[test]
fn check_example_extract_command() {
    let tmp = tempdir().unwrap();
    let output_dir = output_dir(&tmp);
    assert_flexmex_runs(&[
        "example",
        "extract",
        EXAMPLE_NAME,
        &output_dir.to_string_lossy(),
    ]);
    assert!(output_dir.join("scenario.toml").is_file());
    assert!(
        output_dir
            .join("timeseries/wind_onshore/DE.csv")
            .is_file()
    );
}

/// Test the `settings` commands
#[test]
fn check_settings_commands() {
    assert!(get_flexmex_stdout(&["settings", "show-default"]).contains("log_level"));
    assert_eq!(
        get_flexmex_stdout(&["settings", "path"]).trim(),
        "settings.toml"
    );
}

/// Test the `example postprocess` command
#[test]
fn check_example_postprocess_command() {
    let tmp = tempdir().unwrap();
    let output_dir = output_dir(&tmp);
    assert_flexmex_runs(&[
        "example",
        "postprocess",
        EXAMPLE_NAME,
        &output_dir.to_string_lossy(),
    ]);
    assert!(output_dir.join("Scalars.csv").is_file());
}

// NB: `example preprocess` is covered by the two_regions tests
