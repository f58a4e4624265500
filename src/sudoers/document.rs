// src/sudoers/document.rs
// Per-file parser: drives one file through classification and extraction

use super::aliases::parse_alias;
use super::classifier::{LineKind, classify, logical_lines};
use super::defaults::DefaultsAccumulator;
use super::directives::IncludeDirectives;
use super::specs::{parse_default_override, parse_user_specification};
use super::types::{ParseWarning, ScanOptions, SudoersDocument};
use crate::error::{Result, SudoersError};
use std::path::Path;
use tracing::debug;

/// Read and parse one sudoers file. The file is read in full and closed
/// before parsing starts.
pub fn parse_document(path: &Path, options: &ScanOptions) -> Result<SudoersDocument> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SudoersError::file_access(path, e))?;
    Ok(parse_content(path, &content, options))
}

/// Parse already-loaded file content. Pure: the same input always yields the
/// same document.
pub fn parse_content(path: &Path, content: &str, options: &ScanOptions) -> SudoersDocument {
    let mut parser = FileParser::new(path);
    for line in logical_lines(content, options.tab_width) {
        let kind = classify(&line.text);
        if kind.is_configuration() {
            parser.doc.raw_lines.extend(line.physical.iter().cloned());
        }
        parser.accept(line.number, &line.text, kind);
    }
    let doc = parser.finish();

    debug!(
        path = %doc.path.display(),
        aliases = doc.aliases.len(),
        defaults = doc.defaults.len(),
        overrides = doc.default_overrides.len(),
        specs = doc.user_specifications.len(),
        includes = doc.direct_includes.len(),
        "parsed sudoers file"
    );
    doc
}

/// Accumulator owned by a single parse call
struct FileParser {
    doc: SudoersDocument,
    defaults: DefaultsAccumulator,
    directives: IncludeDirectives,
}

impl FileParser {
    fn new(path: &Path) -> Self {
        Self {
            doc: SudoersDocument::new(path),
            defaults: DefaultsAccumulator::new(),
            directives: IncludeDirectives::default(),
        }
    }

    fn accept(&mut self, number: usize, text: &str, kind: LineKind<'_>) {
        match kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::Include(arg) => self.directives.add_include(arg),
            LineKind::IncludeDir(arg) => {
                if let Some(warning) = self.directives.set_include_dir(number, arg) {
                    self.doc.diagnostics.push(warning);
                }
            }
            LineKind::Defaults(options) => {
                if !self.defaults.add_line(options) {
                    self.unparseable(number, text);
                }
            }
            LineKind::DefaultOverride { scope, body } => match parse_default_override(scope, body) {
                Some(o) => self.doc.default_overrides.push(o),
                None => self.unparseable(number, text),
            },
            LineKind::Alias { kind, body } => match parse_alias(kind, body) {
                Some(alias) => self.doc.aliases.insert(alias),
                None => self.unparseable(number, text),
            },
            LineKind::UserSpec(line) => match parse_user_specification(line) {
                Some(spec) => self.doc.user_specifications.push(spec),
                None => self.unparseable(number, text),
            },
        }
    }

    fn unparseable(&mut self, line: usize, text: &str) {
        debug!(path = %self.doc.path.display(), line, "unparseable sudoers line");
        self.doc.diagnostics.push(ParseWarning::UnparseableLine {
            line,
            text: text.trim().to_string(),
        });
    }

    fn finish(self) -> SudoersDocument {
        let mut doc = self.doc;
        doc.defaults = self.defaults.finish();
        doc.direct_includes = self.directives.includes;
        doc.include_directory = self.directives.include_dir;
        doc
    }
}
