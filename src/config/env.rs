// src/config/env.rs
// Environment overrides - every env var sudoscan reads lives here

use std::path::PathBuf;
use tracing::{debug, warn};

/// Root file override (SUDOSCAN_ROOT)
pub const ROOT_VAR: &str = "SUDOSCAN_ROOT";
/// Parallel parsing override (SUDOSCAN_PARALLEL)
pub const PARALLEL_VAR: &str = "SUDOSCAN_PARALLEL";

/// Values taken from the environment, applied on top of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub root: Option<PathBuf>,
    pub parallel: Option<bool>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary lookup (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let root = lookup(ROOT_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let parallel = lookup(PARALLEL_VAR).and_then(|v| {
            let parsed = parse_bool(&v);
            if parsed.is_none() {
                warn!(value = %v, "Unknown {} value, ignoring", PARALLEL_VAR);
            }
            parsed
        });

        let overrides = Self { root, parallel };
        if overrides != Self::default() {
            debug!(?overrides, "environment overrides loaded");
        }
        overrides
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_no_vars() {
        assert_eq!(EnvOverrides::from_lookup(lookup(&[])), EnvOverrides::default());
    }

    #[test]
    fn test_root_and_parallel() {
        let env = EnvOverrides::from_lookup(lookup(&[
            (ROOT_VAR, "/srv/sudoers"),
            (PARALLEL_VAR, "Yes"),
        ]));
        assert_eq!(env.root, Some(PathBuf::from("/srv/sudoers")));
        assert_eq!(env.parallel, Some(true));
    }

    #[test]
    fn test_blank_root_and_bad_bool_ignored() {
        let env = EnvOverrides::from_lookup(lookup(&[(ROOT_VAR, "  "), (PARALLEL_VAR, "maybe")]));
        assert_eq!(env, EnvOverrides::default());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
