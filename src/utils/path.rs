//! Path utilities for configuration and database files

use crate::error::{IpdbError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Get the ipservice configuration directory
///
/// Priority:
/// 1. IP_API_CONFIG_HOME environment variable
/// 2. XDG_CONFIG_HOME/ipservice
/// 3. ~/.config/ipservice (fallback)
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var("IP_API_CONFIG_HOME") {
        return Ok(PathBuf::from(path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("ipservice"));
    }

    Err(IpdbError::config("Cannot determine config directory"))
}

/// Get the path to the default config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.yaml"))
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Expand `~` and make the path absolute against the working directory.
///
/// Falls back to the expanded path when the working directory is unknown.
pub fn resolve(path: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() || expanded.as_os_str().is_empty() {
        return expanded;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(expanded),
        Err(_) => expanded,
    }
}
