use std::path::PathBuf;

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::contract::CandidateSource;
use crate::error::CollectError;

/// Lists every file below `root`, sorted by relative path.
///
/// Symlinks are not followed. The returned paths are `root`-joined so they
/// can be read directly when the plan is applied.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl CandidateSource for DirectoryScanner {
    fn list_candidates(&self) -> Result<Vec<PathBuf>, CollectError> {
        info!(root = %self.root.display(), "Scanning for candidate artifacts");

        if !self.root.is_dir() {
            error!(root = %self.root.display(), "Results directory does not exist");
            return Err(CollectError::io(
                &self.root,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "results directory does not exist",
                ),
            ));
        }

        let mut relative: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_else(|| self.root.clone());
                error!(error = %e, path = %path.display(), "Failed to walk results directory");
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed"));
                CollectError::io(path, io)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            // Entries yielded by WalkDir::new(root) always live under root.
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                relative.push(rel.to_path_buf());
            }
        }

        relative.sort();
        debug!(count = relative.len(), "Collected candidate paths");
        Ok(relative.into_iter().map(|rel| self.root.join(rel)).collect())
    }
}
