// src/sudoers/classifier.rs
// Line normalization and grammatical classification

use super::types::{AliasKind, ScopeKind};
use strum::IntoEnumIterator;

/// Grammatical category of one logical line, borrowing the text after the keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// `#include path` or `@include path`
    Include(&'a str),
    /// `#includedir dir` or `@includedir dir`
    IncludeDir(&'a str),
    /// Plain `Defaults opt, opt, ...`
    Defaults(&'a str),
    /// `Defaults` immediately followed by one of `@ : ! >`; `body` starts after the delimiter
    DefaultOverride { scope: ScopeKind, body: &'a str },
    /// `User_Alias NAME = ...` and friends; `body` starts after the keyword
    Alias { kind: AliasKind, body: &'a str },
    /// Anything else: attempted as a permission grant
    UserSpec(&'a str),
}

impl LineKind<'_> {
    /// Whether the line is kept in a document's raw configuration lines
    pub fn is_configuration(&self) -> bool {
        !matches!(self, LineKind::Blank | LineKind::Comment)
    }
}

/// One logical line: physical lines joined on trailing backslashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line
    pub number: usize,
    /// Joined text with continuation backslashes removed
    pub text: String,
    /// The normalized physical lines, as written
    pub physical: Vec<String>,
}

/// Strip the line ending and expand tabs to a fixed run of spaces
pub fn normalize_line(line: &str, tab_width: usize) -> String {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.contains('\t') {
        line.replace('\t', &" ".repeat(tab_width))
    } else {
        line.to_string()
    }
}

/// Split file content into logical lines, handling LF and CRLF endings
pub fn logical_lines(content: &str, tab_width: usize) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (idx, raw) in content.lines().enumerate() {
        let physical = normalize_line(raw, tab_width);
        let (piece, continues) = match physical.strip_suffix('\\') {
            Some(head) => (head.to_string(), true),
            None => (physical.clone(), false),
        };

        let mut current = pending.take().unwrap_or_else(|| LogicalLine {
            number: idx + 1,
            text: String::new(),
            physical: Vec::new(),
        });
        current.text.push_str(&piece);
        current.physical.push(physical);

        // a comment ends at the newline even when it ends in a backslash
        if continues && classify(&current.text) != LineKind::Comment {
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }

    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

/// Classify one logical line. First match wins; keywords are case-sensitive.
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim_start();
    if line.trim_end().is_empty() {
        return LineKind::Blank;
    }

    if let Some(rest) = directive_argument(line, "includedir") {
        return LineKind::IncludeDir(rest);
    }
    if let Some(rest) = directive_argument(line, "include") {
        return LineKind::Include(rest);
    }
    if line.starts_with('#') {
        return LineKind::Comment;
    }

    if let Some(rest) = line.strip_prefix("Defaults") {
        match rest.chars().next() {
            None => return LineKind::Defaults(""),
            Some(c) if c.is_whitespace() => return LineKind::Defaults(rest.trim()),
            Some(c) => {
                if let Some(scope) = ScopeKind::from_delimiter(c) {
                    return LineKind::DefaultOverride {
                        scope,
                        body: &rest[c.len_utf8()..],
                    };
                }
            }
        }
    }

    for kind in AliasKind::iter() {
        if let Some(rest) = line.strip_prefix(kind.keyword())
            && rest.starts_with(char::is_whitespace)
        {
            return LineKind::Alias { kind, body: rest };
        }
    }

    LineKind::UserSpec(line.trim_end())
}

/// Argument of `#<name> arg` or `@<name> arg`, if the line is that directive
fn directive_argument<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line
        .strip_prefix('#')
        .or_else(|| line.strip_prefix('@'))?
        .strip_prefix(name)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let arg = rest.trim();
    if arg.is_empty() { None } else { Some(arg) }
}

/// Split a comma-separated selector list into an ordered set.
///
/// Members are trimmed, empty members dropped and duplicates removed. A
/// backslash-escaped comma (`\,`) stays part of its member.
pub fn split_list(list: &str) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    let mut flush = |current: &mut String| {
        let member = current.trim();
        if !member.is_empty() && !members.iter().any(|m| m == member) {
            members.push(member.to_string());
        }
        current.clear();
    };

    for c in list.chars() {
        match c {
            ',' if !escaped => flush(&mut current),
            _ => current.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    flush(&mut current);

    members
}
