use crate::error::{CoreError, Result};
use crate::tree_builder::{DEFAULT_EXCLUSIONS, ExclusionSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILENAME: &str = ".ctxyank.toml";
pub const PREFERENCES_DIR: &str = "ctxyank";
pub const PREFERENCES_FILENAME: &str = "preferences.toml";
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub respect_gitignore: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            respect_gitignore: false,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Explicit path wins; otherwise `<root>/.ctxyank.toml` if it exists.
    pub fn resolve_config_path(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(CoreError::Config(format!(
                "Specified config file not found: {}",
                path.display()
            ))),
            None => {
                let default_path = root.join(DEFAULT_CONFIG_FILENAME);
                if default_path.is_file() {
                    log::debug!("Using config file {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!("No config file at {}", default_path.display());
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(root, explicit)? {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::new(self.scan.exclude.iter().cloned())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.generation.debounce_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Presentation settings persisted between runs. The selection core never
/// reads these.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

impl Preferences {
    /// `<config dir>/ctxyank/preferences.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PREFERENCES_DIR).join(PREFERENCES_FILENAME))
    }

    /// Missing files yield defaults; unreadable or malformed ones are errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No preferences at {}, using defaults", path.display());
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(self)?;
        fs::write(path, content)?;
        log::debug!("Saved preferences to {}", path.display());
        Ok(())
    }
}
