//! Configuration for the doctree system.
//!
//! A single TOML file with a paths section and defaults, resolved from
//! `DOCTREE_CONFIG_DIR`, then `XDG_CONFIG_HOME/doctree`, then `~/.doctree`.
//! Missing config is not an error; defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Filesystem locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Tunable defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Filesystem locations used by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Data root for persisted structures.
    pub root: PathBuf,
}

/// Tunable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Cap on header-search results returned per query.
    pub max_search_results: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_search_results: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

fn default_data_root() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCTREE_DATA_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join("doctree");
        }
    }
    directories::BaseDirs::new()
        .map(|base| base.home_dir().join(".doctree"))
        .unwrap_or_else(|| PathBuf::from(".doctree"))
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCTREE_CONFIG_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("config.toml"));
        }
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("doctree").join("config.toml"));
        }
    }
    directories::BaseDirs::new().map(|base| base.home_dir().join(".doctree").join("config.toml"))
}

impl Config {
    /// Load the global config, falling back to defaults when no file
    /// exists.
    pub fn load() -> Result<Self> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config file: {e}")))?;
        Ok(config)
    }

    /// Write the config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {e}")))?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }
}
