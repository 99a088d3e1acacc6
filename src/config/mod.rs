//! Configuration
//!
//! Layered configuration for the server: built-in defaults, the global
//! `config.toml`, an explicit file and finally `AINO__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod storage;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use storage::StorageConfig;

use crate::access::AccessConfig;
use crate::logging::LoggingConfig;
use crate::module::ModuleConfig;
use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_enrichment_timeout_ms() -> u64 {
    2000
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upper bound for each directory-listing enrichment read.
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            enrichment_timeout_ms: default_enrichment_timeout_ms(),
        }
    }
}

/// Effective configuration of one server process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AinoConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub access: AccessConfig,

    /// Modules registered at startup.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}
