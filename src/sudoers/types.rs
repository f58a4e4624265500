// src/sudoers/types.rs
// Document model produced by the sudoers parser

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use thiserror::Error;

/// Tab stop used when normalizing lines, matching what visudo users expect
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Options threaded through the per-file parser and traversal engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Number of spaces each tab expands to
    pub tab_width: usize,
    /// Parse each BFS level in parallel (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            parallel: false,
        }
    }
}

// ═══════════════════════════════════════
// ALIASES
// ═══════════════════════════════════════

/// The four sudoers alias kinds
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::IntoStaticStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    #[strum(serialize = "User_Alias")]
    User,
    #[strum(serialize = "Runas_Alias")]
    Runas,
    #[strum(serialize = "Host_Alias")]
    Host,
    #[strum(serialize = "Cmnd_Alias")]
    Command,
}

impl AliasKind {
    /// Keyword that introduces this alias kind in a sudoers file
    pub fn keyword(&self) -> &'static str {
        self.into()
    }

    /// JSON key of the alias table holding this kind
    pub fn table_key(&self) -> &'static str {
        match self {
            AliasKind::User => "user_alias",
            AliasKind::Runas => "runas_alias",
            AliasKind::Host => "host_alias",
            AliasKind::Command => "cmnd_alias",
        }
    }

    /// JSON key used for the members of one alias
    pub fn member_key(&self) -> &'static str {
        match self {
            AliasKind::User | AliasKind::Runas => "users",
            AliasKind::Host => "hosts",
            AliasKind::Command => "commands",
        }
    }
}

/// One named alias and its members, in declaration order without duplicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub kind: AliasKind,
    pub name: String,
    pub members: Vec<String>,
}

impl Serialize for Alias {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry(self.kind.member_key(), &self.members)?;
        map.end()
    }
}

/// Per-file alias tables, one per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    pub user: Vec<Alias>,
    pub runas: Vec<Alias>,
    pub host: Vec<Alias>,
    pub command: Vec<Alias>,
}

impl Serialize for AliasTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for kind in AliasKind::iter() {
            map.serialize_entry(kind.table_key(), self.of_kind(kind))?;
        }
        map.end()
    }
}

impl AliasTable {
    pub fn of_kind(&self, kind: AliasKind) -> &[Alias] {
        match kind {
            AliasKind::User => &self.user,
            AliasKind::Runas => &self.runas,
            AliasKind::Host => &self.host,
            AliasKind::Command => &self.command,
        }
    }

    fn of_kind_mut(&mut self, kind: AliasKind) -> &mut Vec<Alias> {
        match kind {
            AliasKind::User => &mut self.user,
            AliasKind::Runas => &mut self.runas,
            AliasKind::Host => &mut self.host,
            AliasKind::Command => &mut self.command,
        }
    }

    /// Look up an alias by kind and name
    pub fn get(&self, kind: AliasKind, name: &str) -> Option<&Alias> {
        self.of_kind(kind).iter().find(|a| a.name == name)
    }

    /// Insert an alias. A name already declared for the same kind absorbs the
    /// new members instead of creating a second entry.
    pub fn insert(&mut self, alias: Alias) {
        let table = self.of_kind_mut(alias.kind);
        match table.iter_mut().find(|a| a.name == alias.name) {
            Some(existing) => extend_unique(&mut existing.members, alias.members),
            None => table.push(alias),
        }
    }

    pub fn len(&self) -> usize {
        self.user.len() + self.runas.len() + self.host.len() + self.command.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════
// DEFAULTS
// ═══════════════════════════════════════

/// One decomposed `Defaults` option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DefaultEntry {
    /// Bare option kept verbatim (`!visiblepw`, `env_reset`, `timestamp_timeout=5`)
    Flag(String),
    /// `env_keep` variable patterns
    EnvKeep {
        env_keep: Vec<String>,
    },
    /// `secure_path` split into its segments
    SecurePath {
        secure_path: Vec<String>,
    },
}

impl DefaultEntry {
    pub fn flag(option: impl Into<String>) -> Self {
        DefaultEntry::Flag(option.into())
    }
}

/// Scope selected by the character following `Defaults`
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScopeKind {
    Host,
    User,
    Command,
    Runas,
}

impl ScopeKind {
    pub fn from_delimiter(c: char) -> Option<Self> {
        match c {
            '@' => Some(ScopeKind::Host),
            ':' => Some(ScopeKind::User),
            '!' => Some(ScopeKind::Command),
            '>' => Some(ScopeKind::Runas),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// `Defaults@host`, `Defaults:user`, `Defaults!cmnd` and `Defaults>runas` lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultOverride {
    pub scope_kind: ScopeKind,
    pub targets: Vec<String>,
    pub options: Vec<DefaultEntry>,
}

// ═══════════════════════════════════════
// USER SPECIFICATIONS
// ═══════════════════════════════════════

/// A permission grant: `users hosts = (operators) TAGS: commands`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserSpecification {
    pub users: Vec<String>,
    pub hosts: Vec<String>,
    pub operators: Vec<String>,
    pub tags: Vec<String>,
    pub commands: Vec<String>,
}

// ═══════════════════════════════════════
// DIAGNOSTICS
// ═══════════════════════════════════════

/// Non-fatal findings recorded while parsing a file
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    #[error("line {line}: no structured grammar matches `{text}`")]
    UnparseableLine { line: usize, text: String },

    #[error("line {line}: #includedir {current} replaces earlier {previous}")]
    AmbiguousIncludeDirective {
        line: usize,
        previous: String,
        current: String,
    },
}

// ═══════════════════════════════════════
// DOCUMENTS
// ═══════════════════════════════════════

/// One parsed sudoers file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SudoersDocument {
    pub path: PathBuf,
    pub aliases: AliasTable,
    pub defaults: Vec<DefaultEntry>,
    pub default_overrides: Vec<DefaultOverride>,
    pub user_specifications: Vec<UserSpecification>,
    #[serde(rename = "configuration")]
    pub raw_lines: Vec<String>,
    #[serde(rename = "include_dir", serialize_with = "serialize_include_dir")]
    pub include_directory: Option<String>,
    #[serde(rename = "included_files")]
    pub direct_includes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ParseWarning>,
}

impl SudoersDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            aliases: AliasTable::default(),
            defaults: Vec::new(),
            default_overrides: Vec::new(),
            user_specifications: Vec::new(),
            raw_lines: Vec::new(),
            include_directory: None,
            direct_includes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The file's accumulated `env_keep` patterns
    pub fn env_keep(&self) -> &[String] {
        self.defaults
            .iter()
            .find_map(|d| match d {
                DefaultEntry::EnvKeep { env_keep } => Some(env_keep.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// The last `secure_path` declared in this file
    pub fn secure_path(&self) -> Option<&[String]> {
        self.defaults.iter().rev().find_map(|d| match d {
            DefaultEntry::SecurePath { secure_path } => Some(secure_path.as_slice()),
            _ => None,
        })
    }
}

fn serialize_include_dir<S: Serializer>(
    dir: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(dir.as_deref().unwrap_or(""))
}

/// Every document reachable from one root file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SudoersCorpus {
    #[serde(rename = "sudoers_files")]
    pub documents: Vec<SudoersDocument>,
    #[serde(rename = "all_parsed_files", serialize_with = "serialize_paths")]
    pub all_discovered_paths: Vec<PathBuf>,
}

impl SudoersCorpus {
    pub fn root(&self) -> Option<&SudoersDocument> {
        self.documents.first()
    }

    pub fn document(&self, path: impl AsRef<Path>) -> Option<&SudoersDocument> {
        let path = path.as_ref();
        self.documents.iter().find(|d| d.path == path)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.all_discovered_paths.iter().any(|p| p == path)
    }

    /// All user specifications across the corpus, paired with their file
    pub fn user_specifications(&self) -> impl Iterator<Item = (&Path, &UserSpecification)> {
        self.documents.iter().flat_map(|d| {
            d.user_specifications
                .iter()
                .map(move |spec| (d.path.as_path(), spec))
        })
    }

    /// All default overrides across the corpus, paired with their file
    pub fn default_overrides(&self) -> impl Iterator<Item = (&Path, &DefaultOverride)> {
        self.documents.iter().flat_map(|d| {
            d.default_overrides
                .iter()
                .map(move |o| (d.path.as_path(), o))
        })
    }
}

fn serialize_paths<S: Serializer>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(paths.len()))?;
    for path in paths {
        seq.serialize_element(&path.to_string_lossy())?;
    }
    seq.end()
}

/// Render a document or corpus as JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> crate::error::Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

/// Append items that are not already present, keeping first-seen order
pub(crate) fn extend_unique(target: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
