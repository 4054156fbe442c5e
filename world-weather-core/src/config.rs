use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{error::ServiceError, units::TemperatureUnit};

/// Environment variable checked first for the API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Older variable name, still honored.
pub const LEGACY_API_KEY_ENV: &str = "OpenWeatherApiKey";

pub const DEFAULT_SEARCH_RESULT_LIMIT: usize = 5;

fn default_search_result_limit() -> usize {
    DEFAULT_SEARCH_RESULT_LIMIT
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// city_list = "/path/to/city.list.json"
/// search_result_limit = 5
/// unit = "celsius"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    /// Dataset used instead of the bundled city list.
    pub city_list: Option<PathBuf>,

    #[serde(default = "default_search_result_limit")]
    pub search_result_limit: usize,

    #[serde(default)]
    pub unit: TemperatureUnit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            city_list: None,
            search_result_limit: DEFAULT_SEARCH_RESULT_LIMIT,
            unit: TemperatureUnit::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where `world-weather update-cities` keeps the downloaded full city list.
    pub fn cached_city_list_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("city.list.json.gz"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key from the environment, falling back to the stored one.
    pub fn resolve_api_key(&self) -> Result<String> {
        let from_env = [API_KEY_ENV, LEGACY_API_KEY_ENV]
            .into_iter()
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()));

        self.pick_api_key(from_env)
    }

    fn pick_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .or_else(|| self.api_key.clone().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| ServiceError::MissingApiKey.into())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "world-weather", "world-weather")
        .ok_or_else(|| anyhow!("Could not determine platform directories"))
}
