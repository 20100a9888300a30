//! Configuration management for Tablesmith
//!
//! Loads configuration with priority:
//! 1. Explicitly specified config file
//! 2. tablesmith.toml in the current directory or a parent
//! 3. Defaults

use crate::history::DEFAULT_MAX_HISTORY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "tablesmith.toml";

/// Tablesmith configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesmithConfig {
    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Settings store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Path of the JSON settings file (can reference env var with ${VAR_NAME})
    #[serde(default = "default_settings_path")]
    pub path: PathBuf,

    /// Maximum number of remembered values per history category
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Emit logs as JSON lines instead of human readable text
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
            max_history: default_max_history(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json_logs: false,
        }
    }
}

impl TablesmithConfig {
    /// Load tablesmith.toml from the current directory or a parent,
    /// falling back to defaults when none exists
    pub fn load() -> Result<Self> {
        match Self::find_config_file()? {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from: {:?}", path);

        let contents = fs::read_to_string(path).map_err(|e| {
            Error::config_error(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::parse(&contents)
            .map_err(|e| Error::config_error(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    /// Parse configuration text and resolve environment references
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: TablesmithConfig =
            toml::from_str(contents).map_err(|e| Error::config_error(e.to_string()))?;

        config.resolve_env_vars();
        config.validate()?;

        Ok(config)
    }

    fn find_config_file() -> Result<Option<PathBuf>> {
        let mut current = env::current_dir()?;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    fn resolve_env_vars(&mut self) {
        if let Some(path) = self.settings.path.to_str()
            && let Some(resolved) = Self::resolve_env_var(path)
        {
            self.settings.path = PathBuf::from(resolved);
        }

        if let Some(resolved) = Self::resolve_env_var(&self.observability.service_name) {
            self.observability.service_name = resolved;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.settings.max_history == 0 {
            return Err(Error::config_error("settings.max_history must be at least 1"));
        }
        Ok(())
    }

    /// Resolve a single ${VAR_NAME} reference
    fn resolve_env_var(value: &str) -> Option<String> {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            env::var(var_name).ok()
        } else {
            Some(value.to_string())
        }
    }
}

fn default_settings_path() -> PathBuf {
    PathBuf::from(".tablesmith").join("settings.json")
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_service_name() -> String {
    "tablesmith".to_string()
}
