//! Configuration module for ipservice
//!
//! Handles loading configuration from an optional YAML file and environment
//! variables.

use crate::database::LoadMode;
use crate::error::{IpdbError, Result};
use crate::utils::path;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "IP_API_CONFIG";
pub const ENV_QQWRY_PATH: &str = "IP_API_QQWRY_PATH";
pub const ENV_QQWRY_URL: &str = "IP_API_QQWRY_URL";
pub const ENV_AUTO_FETCH: &str = "IP_API_AUTO_FETCH";
pub const ENV_LOAD_MODE: &str = "IP_API_LOAD_MODE";

const DEFAULT_DATA_FILE: &str = "qqwry.dat";
const DEFAULT_DATA_URL: &str =
    "https://github.com/metowolf/qqwry.dat/releases/latest/download/qqwry.dat";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// QQwry file location
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Mirrors tried in order when the file has to be fetched
    #[serde(default = "default_download_urls")]
    pub download_urls: Vec<String>,

    /// Download the file on startup when it is missing
    #[serde(default = "default_true")]
    pub auto_fetch: bool,

    #[serde(default)]
    pub load_mode: LoadMode,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output in JSON format
    #[serde(default)]
    pub json: bool,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub enable_colors: bool,
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_download_urls() -> Vec<String> {
    vec![DEFAULT_DATA_URL.to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            download_urls: default_download_urls(),
            auto_fetch: true,
            load_mode: LoadMode::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            enable_colors: true,
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    ///
    /// `config_file` takes precedence over `IP_API_CONFIG`; without either,
    /// the default config file is read only if it exists.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match explicit {
            Some(file) => Self::from_file(&file)?,
            None => match path::config_file() {
                Ok(file) if file.exists() => Self::from_file(&file)?,
                _ => Self::default(),
            },
        };

        config.apply_env_from(|key| env::var(key).ok())?;
        config.database.path = path::resolve(&config.database.path);
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(file: &Path) -> Result<Self> {
        log::debug!("Reading config file: {:?}", file);
        let content = fs::read_to_string(file)
            .map_err(|e| IpdbError::config(format!("Failed to read config file {:?}: {}", file, e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| IpdbError::Yaml(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment overrides read through `lookup`
    fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(val) = get(ENV_QQWRY_PATH) {
            self.database.path = PathBuf::from(val);
        }
        if let Some(val) = get(ENV_QQWRY_URL) {
            self.database.download_urls = vec![val];
        }
        if let Some(val) = get(ENV_AUTO_FETCH) {
            self.database.auto_fetch = is_truthy(&val);
        }
        if let Some(val) = get(ENV_LOAD_MODE) {
            self.database.load_mode = val.parse()?;
        }
        Ok(())
    }

    /// Check that the configured database file is usable
    pub fn validate(&self) -> Result<()> {
        let db_path = &self.database.path;
        if db_path.as_os_str().is_empty() {
            return Err(IpdbError::config("qqwry.dat path must not be empty"));
        }
        match fs::metadata(db_path) {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(IpdbError::config(format!("{:?} is not a file", db_path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IpdbError::config(format!("qqwry.dat not found: {:?}", db_path)))
            }
            Err(e) => Err(IpdbError::config(format!("Cannot read {:?}: {}", db_path, e))),
        }
    }

    /// Serialize the effective configuration
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| IpdbError::Yaml(format!("Failed to serialize config: {}", e)))
    }
}

/// Interpret an environment flag value
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "y" | "t"
    )
}
