//! `load_config` module: loads a static YAML config, applies environment overrides, and
//! resolves every path against the project root.
//!
//! This module is the only place where YAML is parsed and mapped to strongly-typed structs.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file
//! - Map loosely-typed rule entries (string kinds, `substring`/`suffix` keys) to core types
//! - Apply `ARTIFACT_MERGE_*` environment overrides
//! - Resolve relative paths against `project_root` (default: the config file's directory)
//!
//! Destination selection and rule-set validation are left to the pipeline's first stage, so that
//! a configuration error is reported the same way whether it comes from YAML or the environment.
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.

use anyhow::{bail, Context, Result};
use artifact_merge_core::artifact::ArtifactKind;
use artifact_merge_core::destination::results_dir as default_results_dir;
use artifact_merge_core::naming::{MatchPattern, NamingRule};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEVICE_NAME_ENV: &str = "ARTIFACT_MERGE_DEVICE_NAME";
pub const CLEAR_DESTINATION_ENV: &str = "ARTIFACT_MERGE_CLEAR_DESTINATION";

/// Fully resolved configuration for one collection run.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub project_root: PathBuf,
    pub module_dir: PathBuf,
    pub device_name: String,
    pub results_dir: PathBuf,
    pub namespace: String,
    pub copy_to_library: bool,
    pub target_project_path: Option<String>,
    pub exclude_timestamped: bool,
    pub clear_destination_before_copy: bool,
    /// Replaces the default rule set when present.
    pub rules: Option<Vec<NamingRule>>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    project_root: Option<PathBuf>,
    module_dir: PathBuf,
    device_name: String,
    #[serde(default)]
    results_dir: Option<PathBuf>,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    copy_to_library: bool,
    #[serde(default)]
    target_project_path: Option<String>,
    #[serde(default = "default_exclude_timestamped")]
    exclude_timestamped: bool,
    #[serde(default)]
    clear_destination_before_copy: bool,
    #[serde(default)]
    rules: Vec<RuleSection>,
}

#[derive(Debug, Deserialize)]
struct RuleSection {
    kind: String,
    #[serde(default)]
    substring: Option<String>,
    #[serde(default)]
    suffix: Option<String>,
    canonical_name: String,
}

fn default_exclude_timestamped() -> bool {
    true
}

impl RuleSection {
    fn into_rule(self, index: usize) -> Result<NamingRule> {
        let pattern = match (self.substring, self.suffix) {
            (Some(s), None) => MatchPattern::Substring(s),
            (None, Some(s)) => MatchPattern::Suffix(s),
            _ => {
                error!(index, "Rule must set exactly one of substring or suffix");
                bail!("rules[{index}]: set exactly one of `substring` or `suffix`");
            }
        };
        Ok(NamingRule::new(
            ArtifactKind::from_label(&self.kind),
            pattern,
            self.canonical_name,
        ))
    }
}

/// Loads the YAML config at `path` and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CollectConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let base = path_ref
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let project_root = match raw.project_root {
        Some(root) => base.join(root),
        None => base,
    };

    let mut device_name = raw.device_name;
    if let Ok(value) = std::env::var(DEVICE_NAME_ENV) {
        info!(env = DEVICE_NAME_ENV, device_name = %value, "Overriding device name from environment");
        device_name = value;
    }
    if device_name.trim().is_empty() {
        error!("device_name is empty");
        bail!("device_name must not be empty");
    }

    let mut clear_destination_before_copy = raw.clear_destination_before_copy;
    if let Ok(value) = std::env::var(CLEAR_DESTINATION_ENV) {
        clear_destination_before_copy = parse_bool(&value).with_context(|| {
            format!("{CLEAR_DESTINATION_ENV} must be true or false, got {value:?}")
        })?;
        info!(
            env = CLEAR_DESTINATION_ENV,
            clear_destination_before_copy, "Overriding destination clearing from environment"
        );
    }

    let module_dir = project_root.join(&raw.module_dir);
    let results_dir = match raw.results_dir {
        Some(dir) => project_root.join(dir),
        None => default_results_dir(&module_dir, &device_name),
    };

    let rules = if raw.rules.is_empty() {
        None
    } else {
        Some(
            raw.rules
                .into_iter()
                .enumerate()
                .map(|(i, r)| r.into_rule(i))
                .collect::<Result<Vec<_>>>()?,
        )
    };

    let config = CollectConfig {
        project_root,
        module_dir,
        device_name,
        results_dir,
        namespace: raw.namespace,
        copy_to_library: raw.copy_to_library,
        target_project_path: raw.target_project_path,
        exclude_timestamped: raw.exclude_timestamped,
        clear_destination_before_copy,
        rules,
    };

    info!(
        device_name = %config.device_name,
        results_dir = %config.results_dir.display(),
        custom_rules = config.rules.is_some(),
        "Config loaded successfully"
    );
    Ok(config)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => bail!("not a boolean: {other:?}"),
    }
}
