// src/sudoers/mod.rs
// Sudoers parsing and traversal engine
//
// Leaf-first: classifier -> directives / defaults / aliases / specs ->
// document (one file) -> corpus (root file plus everything it includes).

pub mod aliases;
pub mod classifier;
pub mod corpus;
pub mod defaults;
pub mod directives;
pub mod document;
pub mod specs;
pub mod types;

pub use corpus::{DEFAULT_SUDOERS_PATH, Scanner, scan};
pub use document::{parse_content, parse_document};
pub use types::{
    Alias, AliasKind, AliasTable, DefaultEntry, DefaultOverride, ParseWarning, ScanOptions,
    ScopeKind, SudoersCorpus, SudoersDocument, UserSpecification, to_json,
};
