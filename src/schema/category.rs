//! Field categories: display groups for a directory's fields.

use crate::store::Entity;
use crate::types::{new_id, now, Id, PageRequest, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCategory {
    pub id: Id,
    pub application_id: String,
    pub directory_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seeded categories; these cannot be deleted.
    #[serde(default)]
    pub system: bool,
    /// Field skeletons offered when creating a field in this category.
    #[serde(default)]
    pub predefined_fields: Vec<Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

impl FieldCategory {
    pub(crate) fn apply(&mut self, patch: FieldCategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(predefined_fields) = patch.predefined_fields {
            self.predefined_fields = predefined_fields;
        }
        self.updated_at = now();
    }
}

impl Entity for FieldCategory {
    const COLLECTION: &'static str = "field_categories";

    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &str {
        &self.directory_id
    }
}

/// Body of `POST /field-categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFieldCategory {
    pub application_id: String,
    pub directory_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub predefined_fields: Vec<Value>,
}

impl NewFieldCategory {
    pub(crate) fn into_category(self) -> FieldCategory {
        let timestamp = now();
        FieldCategory {
            id: new_id(),
            application_id: self.application_id,
            directory_id: self.directory_id,
            name: self.name.trim().to_string(),
            description: self.description,
            order: self.order,
            enabled: self.enabled,
            system: self.system,
            predefined_fields: self.predefined_fields,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// Body of `PUT /field-categories/{id}`. `system` is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCategoryPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::types::nullable")]
    pub description: Option<Option<String>>,
    pub order: Option<i64>,
    pub enabled: Option<bool>,
    pub predefined_fields: Option<Vec<Value>>,
}

/// Filters for `GET /field-categories`.
#[derive(Debug, Clone, Default)]
pub struct FieldCategoryQuery {
    pub application_id: String,
    pub directory_id: Option<Id>,
    pub enabled: Option<bool>,
    pub system: Option<bool>,
    pub page: PageRequest,
}

impl FieldCategoryQuery {
    pub fn matches(&self, category: &FieldCategory) -> bool {
        category.application_id == self.application_id
            && self
                .directory_id
                .as_ref()
                .map_or(true, |d| *d == category.directory_id)
            && self.enabled.map_or(true, |e| e == category.enabled)
            && self.system.map_or(true, |s| s == category.system)
    }
}
