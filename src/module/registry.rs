//! Module registry and descriptor types.

use crate::config::AinoConfig;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registered when the config names no modules.
pub const DEFAULT_MODULE_ID: &str = "core";

/// Where a module's behavior lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Built into this server.
    System,
    /// Served by a remote process behind the module proxy.
    Remote,
}

fn default_true() -> bool {
    true
}

/// `[[modules]]` entry in the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub id: String,
    pub name: String,
    pub kind: ModuleKind,
    /// Required for remote modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A registered module as exposed over `/modules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: String,
    pub name: String,
    pub kind: ModuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub enabled: bool,
}

impl ModuleDescriptor {
    /// Build and validate a descriptor from its config entry.
    pub fn from_config(config: &ModuleConfig) -> Result<Self, ApiError> {
        let id = config.id.trim();
        if id.is_empty() {
            return Err(ApiError::ConfigError("Module id cannot be empty".to_string()));
        }
        if config.name.trim().is_empty() {
            return Err(ApiError::ConfigError(format!(
                "Module '{}' must have a name",
                id
            )));
        }
        if config.kind == ModuleKind::Remote {
            let valid = config
                .base_url
                .as_deref()
                .map(|url| url.starts_with("http://") || url.starts_with("https://"))
                .unwrap_or(false);
            if !valid {
                return Err(ApiError::ConfigError(format!(
                    "Remote module '{}' requires an http(s) base_url",
                    id
                )));
            }
        }

        Ok(Self {
            id: id.to_string(),
            name: config.name.trim().to_string(),
            kind: config.kind,
            base_url: config.base_url.clone(),
            enabled: config.enabled,
        })
    }

    /// The built-in system module.
    pub fn core() -> Self {
        Self {
            id: DEFAULT_MODULE_ID.to_string(),
            name: "Core".to_string(),
            kind: ModuleKind::System,
            base_url: None,
            enabled: true,
        }
    }
}

/// Registry of the modules known to this process.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[[modules]]` config entries, falling back to
    /// the `core` module when there are none.
    pub fn from_config(config: &AinoConfig) -> Result<Self, ApiError> {
        let mut registry = Self::new();
        registry.load_from_config(config)?;
        if registry.is_empty() {
            registry.register(ModuleDescriptor::core());
        }
        Ok(registry)
    }

    /// Register every configured module, later entries replacing earlier ones with the same id.
    pub fn load_from_config(&mut self, config: &AinoConfig) -> Result<(), ApiError> {
        for module in &config.modules {
            let descriptor = ModuleDescriptor::from_config(module)?;
            tracing::debug!(module_id = %descriptor.id, kind = ?descriptor.kind, "registered module");
            self.register(descriptor);
        }
        Ok(())
    }

    /// Register a module, replacing any previous descriptor with the same id.
    pub fn register(&mut self, descriptor: ModuleDescriptor) {
        self.modules.insert(descriptor.id.clone(), descriptor);
    }

    pub fn get(&self, module_id: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(module_id)
    }

    /// Get a module or fail with `NotFound`.
    pub fn get_or_error(&self, module_id: &str) -> Result<&ModuleDescriptor, ApiError> {
        self.get(module_id)
            .ok_or_else(|| ApiError::NotFound(format!("Module {}", module_id)))
    }

    /// All modules ordered by id.
    pub fn list(&self) -> Vec<&ModuleDescriptor> {
        self.modules.values().collect()
    }

    /// Modules filtered by kind
    pub fn list_by_kind(&self, kind: Option<ModuleKind>) -> Vec<&ModuleDescriptor> {
        match kind {
            Some(kind) => self.modules.values().filter(|m| m.kind == kind).collect(),
            None => self.list(),
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
