// src/error.rs
// Error types for sudoscan

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for the sudoscan library
#[derive(Error, Debug)]
pub enum SudoersError {
    /// A root or included file (or include directory) could not be read.
    /// Fatal: the corpus build stops and no partial result is returned.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Result using SudoersError
pub type Result<T> = std::result::Result<T, SudoersError>;

impl SudoersError {
    pub fn file_access(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SudoersError::FileAccess {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Path of the offending file, if this error is tied to one
    pub fn path(&self) -> Option<&Path> {
        match self {
            SudoersError::FileAccess { path, .. } => Some(path),
            _ => None,
        }
    }
}
