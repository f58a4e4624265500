// src/sudoers/specs.rs
// Default overrides and user specifications (permission grants)

use super::classifier::split_list;
use super::defaults::decompose_options;
use super::types::{DefaultOverride, ScopeKind, UserSpecification};
use regex::Regex;
use std::sync::LazyLock;

/// Leading tag such as `NOPASSWD:` or `LOG_OUTPUT:`
#[allow(clippy::unwrap_used)]
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Z][A-Z_]*):\s*").unwrap());

/// Parse a `Defaults<delim>targets options` line.
///
/// `body` is the text right after the delimiter. Targets are the selector run
/// up to the first whitespace that does not sit next to a comma; the rest is
/// the option list. Returns `None` when either part is empty.
pub fn parse_default_override(scope: ScopeKind, body: &str) -> Option<DefaultOverride> {
    let (run, rest) = split_selector_run(body.trim_end());
    let targets = split_list(run);
    if targets.is_empty() {
        return None;
    }

    let options = decompose_options(rest);
    if options.is_empty() {
        return None;
    }

    Some(DefaultOverride {
        scope_kind: scope,
        targets,
        options,
    })
}

/// Parse `users hosts = [(operators)] [TAG: ...] commands`.
///
/// Returns `None` for lines that do not decompose into a user list, a host
/// list and at least one command.
pub fn parse_user_specification(line: &str) -> Option<UserSpecification> {
    let eq = find_unparenthesized(line, '=')?;
    let (lhs, rhs) = (&line[..eq], &line[eq + 1..]);

    let groups = selector_groups(lhs);
    let [users, hosts] = groups.as_slice() else {
        return None;
    };
    let users = split_list(users);
    let hosts = split_list(hosts);

    let mut rest = rhs.trim_start();

    let mut operators = Vec::new();
    if let Some(inner) = rest.strip_prefix('(') {
        let close = inner.find(')')?;
        operators = split_list(&inner[..close]);
        rest = inner[close + 1..].trim_start();
    }

    let mut tags = Vec::new();
    while let Some(caps) = TAG.captures(rest) {
        let tag = caps[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        rest = &rest[caps[0].len()..];
    }

    let commands = split_list(rest);
    if users.is_empty() || hosts.is_empty() || commands.is_empty() {
        return None;
    }

    Some(UserSpecification {
        users,
        hosts,
        operators,
        tags,
        commands,
    })
}

/// Byte offset of the first `needle` outside parentheses
fn find_unparenthesized(s: &str, needle: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split off the leading comma-list of selectors.
///
/// Whitespace ends the run unless a comma sits directly before or after it,
/// so `STAFF, INTERNS !requiretty` yields `STAFF, INTERNS`.
fn split_selector_run(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let mut prev = None;

    for (i, c) in s.char_indices() {
        if c.is_whitespace() {
            let next = s[i..].chars().find(|c| !c.is_whitespace());
            if prev != Some(',') && next != Some(',') {
                return (&s[..i], &s[i..]);
            }
        } else {
            prev = Some(c);
        }
    }
    (s, "")
}

/// Whitespace-separated selector lists, each possibly comma-joined
fn selector_groups(s: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let (run, tail) = split_selector_run(rest);
        groups.push(run);
        rest = tail.trim_start();
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sudoers::types::DefaultEntry;

    // ============================================================================
    // parse_default_override tests
    // ============================================================================

    #[test]
    fn test_override_user_scope() {
        let o = parse_default_override(ScopeKind::User, "alice !authenticate").unwrap();
        assert_eq!(o.scope_kind, ScopeKind::User);
        assert_eq!(o.targets, vec!["alice"]);
        assert_eq!(o.options, vec![DefaultEntry::flag("!authenticate")]);
    }

    #[test]
    fn test_override_targets_reference_alias_unresolved() {
        let o = parse_default_override(ScopeKind::Host, "WEBSERVERS insults").unwrap();
        assert_eq!(o.targets, vec!["WEBSERVERS"]);
        assert_eq!(o.options, vec![DefaultEntry::flag("insults")]);
    }

    #[test]
    fn test_override_comma_separated_targets_with_spaces() {
        let o = parse_default_override(ScopeKind::User, "STAFF, INTERNS !requiretty, !lecture").unwrap();
        assert_eq!(o.targets, vec!["STAFF", "INTERNS"]);
        assert_eq!(
            o.options,
            vec![DefaultEntry::flag("!requiretty"), DefaultEntry::flag("!lecture")]
        );
    }

    #[test]
    fn test_override_command_and_runas_scopes() {
        let o = parse_default_override(ScopeKind::Command, "/usr/bin/less noexec").unwrap();
        assert_eq!(o.targets, vec!["/usr/bin/less"]);
        let o = parse_default_override(ScopeKind::Runas, "root !set_logname").unwrap();
        assert_eq!(o.scope_kind, ScopeKind::Runas);
        assert_eq!(o.targets, vec!["root"]);
    }

    #[test]
    fn test_override_options_special_cased() {
        let o = parse_default_override(ScopeKind::Host, "db1 secure_path = /usr/bin:/bin").unwrap();
        assert_eq!(
            o.options,
            vec![DefaultEntry::SecurePath {
                secure_path: vec!["/usr/bin".to_string(), "/bin".to_string()]
            }]
        );
    }

    #[test]
    fn test_override_missing_parts() {
        assert!(parse_default_override(ScopeKind::User, "").is_none());
        assert!(parse_default_override(ScopeKind::User, "alice").is_none());
        // a lone token is a target without options
        assert!(parse_default_override(ScopeKind::User, " !requiretty").is_none());
    }

    // ============================================================================
    // parse_user_specification tests
    // ============================================================================

    #[test]
    fn test_user_spec_full() {
        let spec = parse_user_specification("%wheel ALL=(ALL) NOPASSWD: ALL").unwrap();
        assert_eq!(spec.users, vec!["%wheel"]);
        assert_eq!(spec.hosts, vec!["ALL"]);
        assert_eq!(spec.operators, vec!["ALL"]);
        assert_eq!(spec.tags, vec!["NOPASSWD"]);
        assert_eq!(spec.commands, vec!["ALL"]);
    }

    #[test]
    fn test_user_spec_without_operators_or_tags() {
        let spec = parse_user_specification("alice myhost = /usr/bin/systemctl restart httpd").unwrap();
        assert_eq!(spec.users, vec!["alice"]);
        assert_eq!(spec.hosts, vec!["myhost"]);
        assert!(spec.operators.is_empty());
        assert!(spec.tags.is_empty());
        assert_eq!(spec.commands, vec!["/usr/bin/systemctl restart httpd"]);
    }

    #[test]
    fn test_user_spec_lists_and_multiple_tags() {
        let spec = parse_user_specification(
            "alice, bob  web1, web2 = (root, operator) NOPASSWD: SETENV: /bin/ls, SHUTDOWN",
        )
        .unwrap();
        assert_eq!(spec.users, vec!["alice", "bob"]);
        assert_eq!(spec.hosts, vec!["web1", "web2"]);
        assert_eq!(spec.operators, vec!["root", "operator"]);
        assert_eq!(spec.tags, vec!["NOPASSWD", "SETENV"]);
        assert_eq!(spec.commands, vec!["/bin/ls", "SHUTDOWN"]);
    }

    #[test]
    fn test_user_spec_runas_group_kept_verbatim() {
        let spec = parse_user_specification("root ALL=(ALL:ALL) ALL").unwrap();
        assert_eq!(spec.operators, vec!["ALL:ALL"]);
        assert_eq!(spec.commands, vec!["ALL"]);
    }

    #[test]
    fn test_user_spec_unparseable() {
        assert!(parse_user_specification("just some words").is_none());
        assert!(parse_user_specification("alice = /bin/ls").is_none());
        assert!(parse_user_specification("alice ALL = ").is_none());
        assert!(parse_user_specification("alice ALL = NOPASSWD:").is_none());
        assert!(parse_user_specification("alice ALL = (root /bin/ls").is_none());
    }

    // ============================================================================
    // helper tests
    // ============================================================================

    #[test]
    fn test_find_unparenthesized() {
        assert_eq!(find_unparenthesized("a (b=c) = d", '='), Some(8));
        assert_eq!(find_unparenthesized("no equals", '='), None);
    }

    #[test]
    fn test_selector_groups() {
        assert_eq!(selector_groups("%wheel ALL"), vec!["%wheel", "ALL"]);
        assert_eq!(selector_groups("a ,b  c"), vec!["a ,b", "c"]);
        assert!(selector_groups("   ").is_empty());
    }
}
