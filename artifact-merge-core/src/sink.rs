use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use crate::contract::{ArtifactSink, WrittenArtifact};
use crate::error::CollectError;

/// Writes plan entries onto the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemSink;

impl FileSystemSink {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactSink for FileSystemSink {
    fn prepare(&self, destination: &Path, clear: bool) -> Result<(), CollectError> {
        if clear && destination.exists() {
            info!(path = %destination.display(), "Clearing destination before copy");
            let entries = fs::read_dir(destination).map_err(|e| {
                error!(error = ?e, path = %destination.display(), "Failed to list destination");
                CollectError::io(destination, e)
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| CollectError::io(destination, e))?;
                let path = entry.path();
                let file_type = entry.file_type().map_err(|e| CollectError::io(&path, e))?;
                let removed = if file_type.is_dir() {
                    fs::remove_dir_all(&path)
                } else {
                    fs::remove_file(&path)
                };
                removed.map_err(|e| {
                    error!(error = ?e, path = %path.display(), "Failed to remove existing entry");
                    CollectError::io(&path, e)
                })?;
                debug!(path = %path.display(), "Removed existing entry");
            }
        }

        fs::create_dir_all(destination).map_err(|e| {
            error!(error = ?e, path = %destination.display(), "Failed to create destination directory");
            CollectError::io(destination, e)
        })
    }

    fn write(
        &self,
        source: &Path,
        destination_file: &Path,
        canonical_name: &str,
    ) -> Result<WrittenArtifact, CollectError> {
        let content = fs::read(source).map_err(|e| {
            error!(error = ?e, path = %source.display(), "Failed to read source artifact");
            CollectError::io(source, e)
        })?;
        fs::write(destination_file, &content).map_err(|e| {
            error!(error = ?e, path = %destination_file.display(), "Failed to write artifact");
            CollectError::io(destination_file, e)
        })?;

        let sha256 = format!("{:x}", Sha256::digest(&content));
        debug!(
            source = %source.display(),
            destination = %destination_file.display(),
            size = content.len(),
            "Copied artifact"
        );
        Ok(WrittenArtifact {
            source: source.to_path_buf(),
            destination: destination_file.to_path_buf(),
            canonical_name: canonical_name.to_string(),
            bytes: content.len() as u64,
            sha256,
        })
    }
}
