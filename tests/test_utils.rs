//! Test utilities for sudoscan integration tests

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway directory tree of sudoers files
pub struct SudoersTree {
    dir: TempDir,
}

impl SudoersTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Absolute path of `rel` inside the tree (not created)
    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write sudoers file");
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.join(rel);
        fs::create_dir_all(&path).expect("Failed to create dir");
        path
    }
}
