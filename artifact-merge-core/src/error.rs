use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or running a collection.
///
/// A candidate that matches no naming rule is not an error: it is dropped
/// from the plan and reported as discarded.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Required configuration is absent or contradictory. Raised before any file I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A naming rule set failed validation.
    #[error("invalid naming rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    /// Reading a source, or creating/writing the destination, failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CollectError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CollectError::Configuration(_) | CollectError::InvalidRule { .. }
        )
    }
}
