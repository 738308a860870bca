//! Destination selection and the default results layout.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::CollectError;

/// Subdirectory under a module's build outputs where pulled device results land.
pub const DEVICE_RESULTS_DIR: &str = "build/outputs/managed_device_android_test_additional_output";

/// Generated-sources location of merged profiles, relative to the target module.
pub const LIBRARY_PROFILES_DIR: &str = "src/main/generated/baselineProfiles";
pub const RELEASE_PROFILES_DIR: &str = "src/release/generated/baselineProfiles";

/// Where merged artifacts are copied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationSelector {
    /// Into the producing library module's own generated sources.
    Library { module_dir: PathBuf },
    /// Into an application module's release-variant generated sources.
    Application {
        project_root: PathBuf,
        target_project_path: String,
    },
}

impl DestinationSelector {
    /// Selects the destination from the two mutually exclusive options.
    ///
    /// Exactly one of `copy_to_library` and `target_project_path` must be set.
    pub fn from_options(
        copy_to_library: bool,
        target_project_path: Option<&str>,
        project_root: &Path,
        module_dir: &Path,
    ) -> Result<Self, CollectError> {
        let target = target_project_path.map(str::trim).filter(|t| !t.is_empty());
        match (copy_to_library, target) {
            (true, None) => Ok(DestinationSelector::Library {
                module_dir: module_dir.to_path_buf(),
            }),
            (false, Some(target)) => Ok(DestinationSelector::Application {
                project_root: project_root.to_path_buf(),
                target_project_path: target.to_string(),
            }),
            (false, None) => {
                error!("Neither copy_to_library nor target_project_path is set");
                Err(CollectError::Configuration(
                    "one of copy_to_library or target_project_path must be set".into(),
                ))
            }
            (true, Some(target)) => {
                error!(target_project_path = target, "copy_to_library and target_project_path are both set");
                Err(CollectError::Configuration(format!(
                    "copy_to_library and target_project_path ({target}) are mutually exclusive"
                )))
            }
        }
    }

    pub fn resolve(&self) -> PathBuf {
        let dir = match self {
            DestinationSelector::Library { module_dir } => module_dir.join(LIBRARY_PROFILES_DIR),
            DestinationSelector::Application {
                project_root,
                target_project_path,
            } => {
                // Accept Gradle-style ":app:feature" paths as well as plain directories.
                let relative: PathBuf = target_project_path
                    .split([':', '/'])
                    .filter(|s| !s.is_empty())
                    .collect();
                project_root.join(relative).join(RELEASE_PROFILES_DIR)
            }
        };
        info!(destination = %dir.display(), "Resolved destination directory");
        dir
    }
}

/// Default location of pulled results for `device_name` under `module_dir`.
pub fn results_dir(module_dir: &Path, device_name: &str) -> PathBuf {
    module_dir.join(DEVICE_RESULTS_DIR).join(device_name)
}
