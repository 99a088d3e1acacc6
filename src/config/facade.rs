//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::AinoConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources, with an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<AinoConfig, ConfigError> {
        MergeService::load(explicit)
    }

    /// Load configuration from a specific file only (plus environment overlay).
    pub fn load_from_file(path: &Path) -> Result<AinoConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> AinoConfig {
        AinoConfig::default()
    }
}
