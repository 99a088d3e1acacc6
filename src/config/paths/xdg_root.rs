//! XDG base directories for the database and the global config file.

use crate::error::ApiError;
use std::path::PathBuf;

const APP_DIR: &str = "aino";

/// `$NAME` if set and non-empty, else `$HOME/<fallback>`.
fn base_dir(var: &str, fallback: &[&str]) -> Result<PathBuf, ApiError> {
    if let Some(dir) = std::env::var_os(var).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var_os("HOME").filter(|h| !h.is_empty()).ok_or_else(|| {
        ApiError::ConfigError(format!("Neither {} nor HOME is set", var))
    })?;
    Ok(fallback.iter().fold(PathBuf::from(home), |path, part| path.join(part)))
}

/// Default database directory: `$XDG_DATA_HOME/aino/db`
pub fn default_data_dir() -> Result<PathBuf, ApiError> {
    Ok(base_dir("XDG_DATA_HOME", &[".local", "share"])?.join(APP_DIR).join("db"))
}

/// Global config file: `$XDG_CONFIG_HOME/aino/config.toml`
pub fn global_config_path() -> Result<PathBuf, ApiError> {
    Ok(base_dir("XDG_CONFIG_HOME", &[".config"])?.join(APP_DIR).join("config.toml"))
}
