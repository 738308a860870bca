//! Candidate artifacts: files reported by a remote test run before filtering.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `-YYYY-MM-DD-HH-MM-SS` (ASCII digits) immediately before a single extension.
static TIMESTAMP_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-([0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2})\.[^.]+$")
        .expect("timestamp suffix pattern is valid")
});

/// The kind of artifact a candidate was classified as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    BaselineProfile,
    StartupProfile,
    BenchmarkData,
    Custom(String),
    Unknown,
}

impl ArtifactKind {
    /// Parses a kind label as written in configuration files.
    ///
    /// Unrecognised labels become [`ArtifactKind::Custom`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "BaselineProfile" | "baseline_profile" | "baseline-profile" => {
                ArtifactKind::BaselineProfile
            }
            "StartupProfile" | "startup_profile" | "startup-profile" => {
                ArtifactKind::StartupProfile
            }
            "BenchmarkData" | "benchmark_data" | "benchmark-data" => ArtifactKind::BenchmarkData,
            "Unknown" | "unknown" | "" => ArtifactKind::Unknown,
            other => ArtifactKind::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::BaselineProfile => f.write_str("baseline_profile"),
            ArtifactKind::StartupProfile => f.write_str("startup_profile"),
            ArtifactKind::BenchmarkData => f.write_str("benchmark_data"),
            ArtifactKind::Custom(label) => f.write_str(label),
            ArtifactKind::Unknown => f.write_str("unknown"),
        }
    }
}

/// A file produced by a remote test run, as reported to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateArtifact {
    /// Path as reported; only `base_name` takes part in matching.
    pub path: PathBuf,
    pub base_name: String,
    /// `YYYY-MM-DD-HH-MM-SS` when the name carries a run timestamp.
    pub timestamp_suffix: Option<String>,
    pub kind: ArtifactKind,
}

impl CandidateArtifact {
    /// Builds an unclassified candidate from a reported path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_name = base_name(&path);
        let timestamp_suffix = timestamp_suffix(&base_name);
        Self {
            path,
            base_name,
            timestamp_suffix,
            kind: ArtifactKind::Unknown,
        }
    }

    pub fn is_timestamped(&self) -> bool {
        self.timestamp_suffix.is_some()
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Returns the timestamp text when `name` ends in `-YYYY-MM-DD-HH-MM-SS.<ext>`.
pub fn timestamp_suffix(name: &str) -> Option<String> {
    TIMESTAMP_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
