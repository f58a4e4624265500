// src/config/file.rs
// File-based configuration from ~/.sudoscan/config.toml

use super::env::EnvOverrides;
use crate::error::{Result, SudoersError};
use crate::sudoers::types::DEFAULT_TAB_WIDTH;
use crate::sudoers::{DEFAULT_SUDOERS_PATH, ScanOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Root sudoers file to start from
    pub root: PathBuf,
    /// Spaces per tab when normalizing lines
    pub tab_width: usize,
    /// Parse included files in parallel
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_SUDOERS_PATH),
            tab_width: DEFAULT_TAB_WIDTH,
            parallel: false,
        }
    }
}

impl ScanConfig {
    /// Load config from ~/.sudoscan/config.toml, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Load an explicitly requested config file. Unlike [`ScanConfig::load`],
    /// a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SudoersError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents)
            .map_err(|e| SudoersError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config from file");
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| SudoersError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sudoscan")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.tab_width) {
            return Err(SudoersError::Config(format!(
                "tab_width must be between 1 and 16, got {}",
                self.tab_width
            )));
        }
        if self.root.as_os_str().is_empty() {
            return Err(SudoersError::Config("root must not be empty".to_string()));
        }
        Ok(())
    }

    /// Apply environment overrides on top of the file values
    pub fn with_env(mut self, env: &EnvOverrides) -> Self {
        if let Some(root) = &env.root {
            self.root = root.clone();
        }
        if let Some(parallel) = env.parallel {
            self.parallel = parallel;
        }
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            tab_width: self.tab_width,
            parallel: self.parallel,
        }
    }
}
