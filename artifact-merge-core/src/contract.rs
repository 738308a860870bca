//! # contract: collaborator seams around the merge core
//!
//! The core never decides where candidates come from or how bytes reach disk.
//! Both are behind traits so the collector can be driven by the default
//! filesystem implementations ([`crate::scan::DirectoryScanner`],
//! [`crate::sink::FileSystemSink`]) or by `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - With the `test-export-mocks` feature (on by default) the traits export
//!   `MockCandidateSource` / `MockArtifactSink` for downstream test suites.

use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;

use crate::error::CollectError;

/// A file written to the destination by an [`ArtifactSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub canonical_name: String,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the written bytes.
    pub sha256: String,
}

/// Produces candidate paths from an upstream test run.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CandidateSource {
    /// Lists every candidate path, in a deterministic order.
    fn list_candidates(&self) -> Result<Vec<PathBuf>, CollectError>;
}

/// Receives the files of an applied plan.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ArtifactSink {
    /// Ensures `destination` exists. With `clear` set, existing contents are removed first.
    fn prepare(&self, destination: &Path, clear: bool) -> Result<(), CollectError>;

    /// Copies `source` to `destination_file`, overwriting any existing file.
    fn write(
        &self,
        source: &Path,
        destination_file: &Path,
        canonical_name: &str,
    ) -> Result<WrittenArtifact, CollectError>;
}
