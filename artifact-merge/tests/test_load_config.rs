use artifact_merge::load_config::{load_config, CLEAR_DESTINATION_ENV, DEVICE_NAME_ENV};
use artifact_merge_core::artifact::ArtifactKind;
use artifact_merge_core::naming::MatchPattern;
use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::tempdir;

fn clear_env() {
    env::remove_var(DEVICE_NAME_ENV);
    env::remove_var(CLEAR_DESTINATION_ENV);
}

/// A minimal config resolves paths against the config file's directory and keeps the defaults.
#[test]
#[serial]
fn test_load_config_minimal_uses_defaults() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(
        &path,
        "module_dir: baselineprofile\ndevice_name: pixel6Api34\ncopy_to_library: true\n",
    )
    .unwrap();

    let config = load_config(&path).expect("Config should load");

    assert_eq!(config.project_root, dir.path().to_path_buf());
    assert_eq!(config.module_dir, dir.path().join("baselineprofile"));
    assert_eq!(
        config.results_dir,
        dir.path().join(
            "baselineprofile/build/outputs/managed_device_android_test_additional_output/pixel6Api34"
        )
    );
    assert!(config.copy_to_library);
    assert!(config.target_project_path.is_none());
    assert!(config.exclude_timestamped, "exclude_timestamped defaults to true");
    assert!(!config.clear_destination_before_copy);
    assert!(config.rules.is_none());
}

#[test]
#[serial]
fn test_load_config_with_custom_rules_and_results_dir() {
    clear_env();
    let config_yaml = r#"
project_root: project
module_dir: benchmark
device_name: ftl
results_dir: build/fladle/results
namespace: com.example
target_project_path: ":app"
exclude_timestamped: false
clear_destination_before_copy: true
rules:
  - kind: BaselineProfile
    suffix: "-baseline-prof.txt"
    canonical_name: baseline-prof.txt
  - kind: perfetto_trace
    substring: ".perfetto"
    canonical_name: trace.perfetto-trace
"#;
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(&path, config_yaml).unwrap();

    let config = load_config(&path).expect("Config should load");

    assert_eq!(config.project_root, dir.path().join("project"));
    assert_eq!(config.results_dir, dir.path().join("project/build/fladle/results"));
    assert_eq!(config.target_project_path.as_deref(), Some(":app"));
    assert!(!config.exclude_timestamped);
    assert!(config.clear_destination_before_copy);

    let rules = config.rules.expect("custom rules");
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].kind, ArtifactKind::BaselineProfile);
    assert_eq!(
        rules[0].match_pattern,
        MatchPattern::Suffix("-baseline-prof.txt".into())
    );
    assert_eq!(rules[1].kind, ArtifactKind::Custom("perfetto_trace".into()));
    assert_eq!(rules[1].match_pattern, MatchPattern::Substring(".perfetto".into()));
}

#[test]
#[serial]
fn test_load_config_rule_needs_exactly_one_pattern() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(
        &path,
        "module_dir: m\ndevice_name: d\nrules:\n  - kind: x\n    canonical_name: x.txt\n",
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("substring"), "got: {err}");
}

#[test]
#[serial]
fn test_load_config_env_overrides() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(&path, "module_dir: m\ndevice_name: fromFile\n").unwrap();

    env::set_var(DEVICE_NAME_ENV, "fromEnv");
    env::set_var(CLEAR_DESTINATION_ENV, "true");
    let config = load_config(&path);
    clear_env();
    let config = config.expect("Config should load");

    assert_eq!(config.device_name, "fromEnv");
    assert!(config.results_dir.ends_with("fromEnv"));
    assert!(config.clear_destination_before_copy);
}

#[test]
#[serial]
fn test_load_config_rejects_bad_boolean_override() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(&path, "module_dir: m\ndevice_name: d\n").unwrap();

    env::set_var(CLEAR_DESTINATION_ENV, "sometimes");
    let result = load_config(&path);
    clear_env();

    let msg = format!("{:#}", result.unwrap_err());
    assert!(msg.contains(CLEAR_DESTINATION_ENV), "got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(&path, b"not-yaml: [:::").unwrap();

    let err = load_config(&path).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_config_errors_on_missing_device_name() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.yaml");
    write(&path, "module_dir: m\ncopy_to_library: true\n").unwrap();

    assert!(load_config(&path).is_err());
}
