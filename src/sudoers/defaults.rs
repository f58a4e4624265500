// src/sudoers/defaults.rs
// Decomposition of `Defaults` option lists

use super::directives::unquote;
use super::types::{DefaultEntry, extend_unique};
use regex::Regex;
use std::sync::LazyLock;

struct DefaultsPatterns {
    env_keep: Regex,
    secure_path: Regex,
}

static PATTERNS: LazyLock<DefaultsPatterns> = LazyLock::new(build_patterns);

// Literal patterns, checked by the tests below
#[allow(clippy::expect_used)]
fn build_patterns() -> DefaultsPatterns {
    DefaultsPatterns {
        // env_keep = "A B"  /  env_keep += "C"
        env_keep: Regex::new(r"^env_keep\s*\+?=\s*(.*)$").expect("env_keep regex"),
        // secure_path = /usr/sbin:/usr/bin
        secure_path: Regex::new(r"^secure_path\s*=\s*(.*)$").expect("secure_path regex"),
    }
}

/// One classified segment of an option list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSegment {
    EnvKeep(Vec<String>),
    SecurePath(Vec<String>),
    Flag(String),
}

impl From<OptionSegment> for DefaultEntry {
    fn from(segment: OptionSegment) -> Self {
        match segment {
            OptionSegment::EnvKeep(env_keep) => DefaultEntry::EnvKeep { env_keep },
            OptionSegment::SecurePath(secure_path) => DefaultEntry::SecurePath { secure_path },
            OptionSegment::Flag(option) => DefaultEntry::Flag(option),
        }
    }
}

/// Split on commas that are not inside double quotes, dropping empty segments
pub fn split_options(list: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&list[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Classify one option segment
pub fn classify_option(segment: &str) -> OptionSegment {
    let segment = segment.trim();
    let p = &*PATTERNS;

    if let Some(caps) = p.env_keep.captures(segment) {
        let tokens = caps[1]
            .split_whitespace()
            .map(|t| t.replace('"', ""))
            .filter(|t| !t.is_empty())
            .fold(Vec::new(), |mut acc, t| {
                extend_unique(&mut acc, [t]);
                acc
            });
        return OptionSegment::EnvKeep(tokens);
    }

    if let Some(caps) = p.secure_path.captures(segment) {
        let paths = unquote(caps[1].trim())
            .split(':')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        return OptionSegment::SecurePath(paths);
    }

    OptionSegment::Flag(segment.to_string())
}

/// Per-file accumulator for plain `Defaults` lines.
///
/// `env_keep` declarations from every line fold into one running set that is
/// emitted once, after all other entries.
#[derive(Debug, Clone, Default)]
pub struct DefaultsAccumulator {
    entries: Vec<DefaultEntry>,
    env_keep: Vec<String>,
}

impl DefaultsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompose the option list of one `Defaults` line. Returns `false` when
    /// the list holds no options at all.
    pub fn add_line(&mut self, options: &str) -> bool {
        let segments = split_options(options);
        let found = !segments.is_empty();
        for segment in segments {
            match classify_option(segment) {
                OptionSegment::EnvKeep(tokens) => extend_unique(&mut self.env_keep, tokens),
                other => self.entries.push(other.into()),
            }
        }
        found
    }

    pub fn finish(self) -> Vec<DefaultEntry> {
        let mut entries = self.entries;
        entries.push(DefaultEntry::EnvKeep {
            env_keep: self.env_keep,
        });
        entries
    }
}

/// Decompose an override's option list. Each segment stands on its own;
/// nothing accumulates into the file-level `env_keep`.
pub fn decompose_options(options: &str) -> Vec<DefaultEntry> {
    split_options(options)
        .into_iter()
        .map(|s| classify_option(s).into())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ============================================================================
    // split_options tests
    // ============================================================================

    #[test]
    fn test_split_options_basic() {
        assert_eq!(split_options("env_reset, !requiretty ,mail_badpass"), vec!["env_reset", "!requiretty", "mail_badpass"]);
    }

    #[test]
    fn test_split_options_keeps_quoted_commas() {
        assert_eq!(
            split_options(r#"passprompt="Password, please:", insults"#),
            vec![r#"passprompt="Password, please:""#, "insults"]
        );
    }

    #[test]
    fn test_split_options_drops_empty() {
        assert!(split_options(" , ,").is_empty());
    }

    // ============================================================================
    // classify_option tests
    // ============================================================================

    #[test]
    fn test_classify_secure_path() {
        assert_eq!(
            classify_option("secure_path = /usr/bin:/bin"),
            OptionSegment::SecurePath(strings(&["/usr/bin", "/bin"]))
        );
        assert_eq!(
            classify_option("secure_path=\"/sbin:/bin:\""),
            OptionSegment::SecurePath(strings(&["/sbin", "/bin"]))
        );
    }

    #[test]
    fn test_classify_env_keep() {
        assert_eq!(
            classify_option("env_keep += \"FOO BAR\""),
            OptionSegment::EnvKeep(strings(&["FOO", "BAR"]))
        );
        assert_eq!(
            classify_option("env_keep = \"COLORS DISPLAY COLORS\""),
            OptionSegment::EnvKeep(strings(&["COLORS", "DISPLAY"]))
        );
    }

    #[test]
    fn test_classify_flags() {
        assert_eq!(classify_option("!visiblepw"), OptionSegment::Flag("!visiblepw".to_string()));
        assert_eq!(classify_option("timestamp_timeout=5"), OptionSegment::Flag("timestamp_timeout=5".to_string()));
        // removal is not special-cased
        assert_eq!(classify_option("env_keep -= \"HOME\""), OptionSegment::Flag("env_keep -= \"HOME\"".to_string()));
    }

    // ============================================================================
    // DefaultsAccumulator tests
    // ============================================================================

    #[test]
    fn test_accumulator_always_emits_env_keep() {
        let entries = DefaultsAccumulator::new().finish();
        assert_eq!(entries, vec![DefaultEntry::EnvKeep { env_keep: vec![] }]);
    }

    #[test]
    fn test_accumulator_unions_env_keep_in_first_seen_order() {
        let mut acc = DefaultsAccumulator::new();
        acc.add_line("env_keep += \"FOO BAR\"");
        acc.add_line("!visiblepw");
        acc.add_line("env_keep += \"BAR BAZ\"");
        let entries = acc.finish();
        assert_eq!(
            entries,
            vec![
                DefaultEntry::flag("!visiblepw"),
                DefaultEntry::EnvKeep {
                    env_keep: strings(&["FOO", "BAR", "BAZ"])
                },
            ]
        );
    }

    #[test]
    fn test_accumulator_reports_empty_option_list() {
        let mut acc = DefaultsAccumulator::new();
        assert!(!acc.add_line(""));
        assert!(!acc.add_line(" , ,"));
        assert!(acc.add_line("env_reset"));
        assert_eq!(acc.finish().len(), 2);
    }

    #[test]
    fn test_accumulator_multiple_options_per_line() {
        let mut acc = DefaultsAccumulator::new();
        acc.add_line("env_reset, secure_path = /usr/sbin:/usr/bin, mail_badpass");
        let entries = acc.finish();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], DefaultEntry::flag("env_reset"));
        assert_eq!(
            entries[1],
            DefaultEntry::SecurePath {
                secure_path: strings(&["/usr/sbin", "/usr/bin"])
            }
        );
        assert_eq!(entries[2], DefaultEntry::flag("mail_badpass"));
    }

    // ============================================================================
    // decompose_options tests
    // ============================================================================

    #[test]
    fn test_decompose_options_keeps_env_keep_local() {
        let entries = decompose_options("!requiretty, env_keep += \"SSH_AUTH_SOCK\"");
        assert_eq!(
            entries,
            vec![
                DefaultEntry::flag("!requiretty"),
                DefaultEntry::EnvKeep {
                    env_keep: strings(&["SSH_AUTH_SOCK"])
                },
            ]
        );
    }
}
