// Configuration loaded from an optional YAML file

use crate::models::FRAMEWORK_CATALOG;
use crate::notes::DEFAULT_NOTES_FILE;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = "taskboard";
const CONFIG_FILE: &str = "taskboard.yml";

/// Session settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File that project notes are appended to
    pub notes_path: PathBuf,
    /// Directory CSV exports are written into
    pub export_dir: PathBuf,
    /// Framework used by `add` when none is given
    pub default_framework: String,
    /// Frameworks offered as choices
    pub frameworks: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_path: PathBuf::from(DEFAULT_NOTES_FILE),
            export_dir: PathBuf::from("."),
            default_framework: FRAMEWORK_CATALOG[0].to_string(),
            frameworks: FRAMEWORK_CATALOG.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Config {
    /// Default config file location, e.g. `~/.config/taskboard/taskboard.yml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and defaults are used when no file is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Frameworks to offer; the built-in catalog when the list is configured empty
    pub fn catalog(&self) -> Vec<String> {
        if self.frameworks.is_empty() {
            FRAMEWORK_CATALOG.iter().map(|f| f.to_string()).collect()
        } else {
            self.frameworks.clone()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(file = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        if config.default_framework.trim().is_empty() {
            return Err(eyre!("default_framework cannot be empty"));
        }
        Ok(config)
    }
}
