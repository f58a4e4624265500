// src/sudoers/directives.rs
// #include / #includedir handling

use super::types::ParseWarning;
use crate::error::{Result, SudoersError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Include directives collected from a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeDirectives {
    pub includes: Vec<String>,
    pub include_dir: Option<String>,
}

impl IncludeDirectives {
    /// Record an `#include` target
    pub fn add_include(&mut self, arg: &str) {
        self.includes.push(unquote(arg.trim()).to_string());
    }

    /// Record an `#includedir` target. The last declaration wins; replacing an
    /// earlier one yields a warning for the caller to keep.
    pub fn set_include_dir(&mut self, line: usize, arg: &str) -> Option<ParseWarning> {
        let dir = unquote(arg.trim()).to_string();
        let previous = self.include_dir.replace(dir.clone())?;
        warn!(
            line,
            previous = %previous,
            current = %dir,
            "multiple #includedir directives, using the last one"
        );
        Some(ParseWarning::AmbiguousIncludeDirective {
            line,
            previous,
            current: dir,
        })
    }
}

/// Remove one pair of surrounding double quotes
pub(crate) fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Resolve an include target against the directory of the file that named it.
/// Absolute targets are returned unchanged.
pub fn resolve_include(including_file: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        return target.to_path_buf();
    }
    including_file
        .parent()
        .map(|dir| dir.join(target))
        .unwrap_or_else(|| target.to_path_buf())
}

/// Regular files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Symlinks are followed, so a link to
/// a regular file counts as one.
pub fn expand_include_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            SudoersError::file_access(path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    // the root itself is never yielded at min_depth(1), so check it explicitly
    if files.is_empty() && !dir.is_dir() {
        let err = std::fs::read_dir(dir)
            .err()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"));
        return Err(SudoersError::file_access(dir, err));
    }

    debug!(dir = %dir.display(), files = files.len(), "expanded #includedir");
    Ok(files)
}
