//! Directory rows and request bodies.

use crate::store::Entity;
use crate::types::{new_id, now, Id, PageRequest, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryType {
    Table,
    Form,
    Category,
}

impl std::str::FromStr for DirectoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(DirectoryType::Table),
            "form" => Ok(DirectoryType::Form),
            "category" => Ok(DirectoryType::Category),
            other => Err(format!("unknown directory type '{}'", other)),
        }
    }
}

/// Schema-carrying container owned by one application and one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    pub id: Id,
    pub application_id: String,
    pub module_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub directory_type: DirectoryType,
    #[serde(default)]
    pub supports_category: bool,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

fn default_type() -> DirectoryType {
    DirectoryType::Table
}

impl Directory {
    pub(crate) fn apply(&mut self, patch: DirectoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(directory_type) = patch.directory_type {
            self.directory_type = directory_type;
        }
        if let Some(supports_category) = patch.supports_category {
            self.supports_category = supports_category;
        }
        if let Some(config) = patch.config {
            self.config = config;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(is_enabled) = patch.is_enabled {
            self.is_enabled = is_enabled;
        }
        self.updated_at = now();
    }
}

impl Entity for Directory {
    const COLLECTION: &'static str = "directories";

    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &str {
        &self.application_id
    }
}

/// Body of `POST /directories`; application and module come from the query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDirectory {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub directory_type: DirectoryType,
    #[serde(default)]
    pub supports_category: bool,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

impl NewDirectory {
    pub(crate) fn into_directory(self, application_id: &str, module_id: &str) -> Directory {
        let timestamp = now();
        Directory {
            id: new_id(),
            application_id: application_id.to_string(),
            module_id: module_id.to_string(),
            name: self.name.trim().to_string(),
            directory_type: self.directory_type,
            supports_category: self.supports_category,
            config: self.config,
            order: self.order,
            is_enabled: self.is_enabled,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// Body of `PUT /directories/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub directory_type: Option<DirectoryType>,
    pub supports_category: Option<bool>,
    pub config: Option<Map<String, Value>>,
    pub order: Option<i64>,
    pub is_enabled: Option<bool>,
}

/// Filters for `GET /directories`.
#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
    pub application_id: String,
    pub module_id: Option<String>,
    pub directory_type: Option<DirectoryType>,
    pub is_enabled: Option<bool>,
    pub page: PageRequest,
}

impl DirectoryQuery {
    pub fn matches(&self, directory: &Directory) -> bool {
        directory.application_id == self.application_id
            && self
                .module_id
                .as_ref()
                .map_or(true, |m| *m == directory.module_id)
            && self
                .directory_type
                .map_or(true, |t| t == directory.directory_type)
            && self.is_enabled.map_or(true, |e| e == directory.is_enabled)
    }
}
