// src/sudoers/aliases.rs
// User_Alias / Runas_Alias / Host_Alias / Cmnd_Alias extraction

use super::classifier::split_list;
use super::types::{Alias, AliasKind};
use regex::Regex;
use std::sync::LazyLock;

/// `NAME = member, member` following the alias keyword.
/// Alias names start with an uppercase letter and use [A-Z0-9_].
#[allow(clippy::unwrap_used)]
static ALIAS_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+([A-Z][A-Z0-9_]*)\s*=\s*(.*)$").unwrap()
});

/// Parse the text after an alias keyword. Returns `None` when the body is not
/// a `NAME = members` definition.
pub fn parse_alias(kind: AliasKind, body: &str) -> Option<Alias> {
    let caps = ALIAS_BODY.captures(body.trim_end())?;
    Some(Alias {
        kind,
        name: caps[1].to_string(),
        members: split_list(&caps[2]),
    })
}
