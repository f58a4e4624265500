// src/sudoers/corpus.rs
// Corpus traversal: breadth-first expansion of #include / #includedir

use super::directives::{expand_include_dir, resolve_include};
use super::document::parse_document;
use super::types::{ScanOptions, SudoersCorpus, SudoersDocument};
use crate::error::{Result, SudoersError};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Conventional location of the primary sudoers file
pub const DEFAULT_SUDOERS_PATH: &str = "/etc/sudoers";

/// Parse `root` and every file reachable from it with default options
pub fn scan(root: impl AsRef<Path>) -> Result<SudoersCorpus> {
    Scanner::new(ScanOptions::default()).scan(root)
}

/// Builds a [`SudoersCorpus`] from a root file
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Parse the root file and everything it includes, breadth-first.
    ///
    /// Each file is parsed at most once, keyed by its canonical path; a
    /// repeated reference (including a cycle back to an ancestor, or the same
    /// file behind a symlink or `..`) is dropped silently. Documents keep the
    /// path under which the file was first reached. Any unreadable file or
    /// include directory aborts the whole build.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<SudoersCorpus> {
        let root = absolute(root.as_ref())?;
        info!(root = %root.display(), parallel = self.options.parallel, "scanning sudoers");

        #[cfg(not(feature = "parallel"))]
        if self.options.parallel {
            tracing::warn!("built without the `parallel` feature, parsing levels sequentially");
        }

        let corpus = if self.options.parallel {
            self.scan_by_level(root)?
        } else {
            self.scan_sequential(root)?
        };

        info!(
            files = corpus.documents.len(),
            specs = corpus.user_specifications().count(),
            "sudoers scan complete"
        );
        Ok(corpus)
    }

    fn scan_sequential(&self, root: PathBuf) -> Result<SudoersCorpus> {
        let mut corpus = SudoersCorpus::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut queue: VecDeque<PathBuf> = VecDeque::from([root]);

        while let Some(path) = queue.pop_front() {
            if !seen.insert(visit_key(&path)?) {
                debug!(path = %path.display(), "already parsed, skipping");
                continue;
            }
            let doc = parse_document(&path, &self.options)?;
            queue.extend(included_paths(&doc)?);
            corpus.all_discovered_paths.push(path);
            corpus.documents.push(doc);
        }

        Ok(corpus)
    }

    /// Level-synchronous variant: membership checks happen serially before a
    /// level is parsed, so no file is parsed twice and output order matches
    /// the sequential scan.
    fn scan_by_level(&self, root: PathBuf) -> Result<SudoersCorpus> {
        let mut corpus = SudoersCorpus::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut level = vec![root];

        while !level.is_empty() {
            let mut fresh = Vec::with_capacity(level.len());
            for path in level {
                if seen.insert(visit_key(&path)?) {
                    fresh.push(path);
                } else {
                    debug!(path = %path.display(), "already parsed, skipping");
                }
            }

            let docs = self.parse_level(&fresh)?;

            let mut next = Vec::new();
            for (path, doc) in fresh.into_iter().zip(docs) {
                next.extend(included_paths(&doc)?);
                corpus.all_discovered_paths.push(path);
                corpus.documents.push(doc);
            }
            level = next;
        }

        Ok(corpus)
    }

    #[cfg(feature = "parallel")]
    fn parse_level(&self, paths: &[PathBuf]) -> Result<Vec<SudoersDocument>> {
        paths
            .par_iter()
            .map(|p| parse_document(p, &self.options))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn parse_level(&self, paths: &[PathBuf]) -> Result<Vec<SudoersDocument>> {
        paths
            .iter()
            .map(|p| parse_document(p, &self.options))
            .collect()
    }
}

/// Files a document pulls in: its `#include` targets in order, then the
/// sorted contents of its `#includedir`, all made absolute.
pub fn included_paths(doc: &SudoersDocument) -> Result<Vec<PathBuf>> {
    let mut paths = doc
        .direct_includes
        .iter()
        .map(|target| absolute(&resolve_include(&doc.path, target)))
        .collect::<Result<Vec<_>>>()?;

    if let Some(dir) = &doc.include_directory {
        let dir = absolute(&resolve_include(&doc.path, dir))?;
        for file in expand_include_dir(&dir)? {
            paths.push(absolute(&file)?);
        }
    }
    Ok(paths)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| SudoersError::file_access(path, e))
}

/// Identity of a file for the visited set. Resolves `..` and symlinks so one
/// file reached under several spellings is parsed once.
fn visit_key(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| SudoersError::file_access(path, e))
}
