//! StorageConfig and data directory resolution.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; None means the XDG data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Use an in-memory database that is discarded on shutdown.
    #[serde(default)]
    pub temporary: bool,
}

impl StorageConfig {
    /// Resolve the database directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ApiError> {
        match &self.data_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.clone()),
            _ => xdg::default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = StorageConfig {
            data_dir: Some(PathBuf::from("/srv/aino")),
            temporary: false,
        };
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/srv/aino"));
    }

    #[test]
    fn test_default_data_dir_ends_with_db() {
        if std::env::var("HOME").is_err() && std::env::var("XDG_DATA_HOME").is_err() {
            return;
        }
        let path = StorageConfig::default().resolve_data_dir().unwrap();
        assert!(path.ends_with("aino/db"));
    }
}
