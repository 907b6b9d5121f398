//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/commission/commission.toml`
//! 3. Local config: `<dir>/.commission.toml`
//! 4. Environment variables: `COMMISSION_*` prefix
//!
//! The commission rate is a compile-time constant, not a setting.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::services::processor::DEFAULT_JSON_INDENT;
use crate::application::ApplicationError;
use crate::domain::parse_reference_date;

/// Unified configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Indentation of written JSON files
    pub json_indent: usize,
    /// Report statistics and level distribution after calculating
    pub include_stats: bool,
    /// Fixed reference date (`YYYY-MM-DD` or `YYYY-MM`), today if unset
    pub reference_date: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            json_indent: DEFAULT_JSON_INDENT,
            include_stats: false,
            reference_date: None,
        }
    }
}

/// Raw settings for intermediate parsing (None = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub json_indent: Option<usize>,
    pub include_stats: Option<bool>,
    pub reference_date: Option<String>,
}

/// Get the XDG config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "commission").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("commission.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".commission.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// A variable that is set but does not parse is an error, an unset one is None.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("COMMISSION_{}: {}", key.to_uppercase(), e),
        }),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            json_indent: overlay.json_indent.unwrap_or(self.json_indent),
            include_stats: overlay.include_stats.unwrap_or(self.include_stats),
            reference_date: overlay
                .reference_date
                .clone()
                .or_else(|| self.reference_date.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.commission.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply COMMISSION_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("COMMISSION")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<usize>(&config, "json_indent")? {
            settings.json_indent = val;
        }
        if let Some(val) = env_value::<bool>(&config, "include_stats")? {
            settings.include_stats = val;
        }
        if let Some(val) = env_value::<String>(&config, "reference_date")? {
            settings.reference_date = Some(val);
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        self.reference_date()?;
        Ok(())
    }

    /// The configured reference date, parsed.
    pub fn reference_date(&self) -> Result<Option<NaiveDate>, ApplicationError> {
        self.reference_date
            .as_deref()
            .map(parse_reference_date)
            .transpose()
            .map_err(ApplicationError::from)
    }

    /// Render as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

/// Template written by `config init`.
pub fn config_template() -> String {
    format!(
        r#"# commission configuration

# Indentation of written JSON files
json_indent = {}

# Print statistics and level distribution after calculating
include_stats = false

# Fixed reference month for daily profits (YYYY-MM-DD or YYYY-MM), today if unset
# reference_date = "2024-01"
"#,
        DEFAULT_JSON_INDENT
    )
}
