//! Field definitions: one column of a directory's schema.

use crate::store::Entity;
use crate::types::{new_id, now, Id, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Determines how `type`, `schema` and friends are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Primitive,
    Composite,
    Relation,
    Lookup,
    Computed,
}

impl FieldKind {
    /// Lookup and computed values are derived, never written by clients.
    pub fn is_read_only(self) -> bool {
        matches!(self, FieldKind::Lookup | FieldKind::Computed)
    }
}

/// Shape a stored value must have, derived from kind and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    TextList,
    Number,
    Boolean,
    Relation { many: bool },
    Any,
}

const NUMBER_TYPES: &[&str] = &[
    "number", "integer", "int", "decimal", "float", "currency", "percent", "rating", "progress",
];
const BOOLEAN_TYPES: &[&str] = &["boolean", "bool", "checkbox", "switch", "toggle"];
const LIST_TYPES: &[&str] = &["multiselect", "multi_select", "tags", "checkbox_group"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: Id,
    pub directory_id: Id,
    pub key: String,
    pub kind: FieldKind,
    #[serde(rename = "type")]
    pub field_type: String,
    /// UI and validation hints: label, options, placeholder, min/max...
    #[serde(default = "empty_object")]
    pub schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators: Option<Value>,
    #[serde(default)]
    pub read_roles: Vec<String>,
    #[serde(default)]
    pub write_roles: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub category_id: Option<Id>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub(crate) fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl FieldDefinition {
    pub fn value_type(&self) -> ValueType {
        let ty = self.field_type.to_ascii_lowercase();
        match self.kind {
            FieldKind::Relation => ValueType::Relation {
                many: ty.ends_with("many"),
            },
            FieldKind::Composite | FieldKind::Lookup | FieldKind::Computed => ValueType::Any,
            FieldKind::Primitive if NUMBER_TYPES.contains(&ty.as_str()) => ValueType::Number,
            FieldKind::Primitive if BOOLEAN_TYPES.contains(&ty.as_str()) => ValueType::Boolean,
            FieldKind::Primitive if LIST_TYPES.contains(&ty.as_str()) => ValueType::TextList,
            FieldKind::Primitive => ValueType::Text,
        }
    }

    /// Look up a hint in `validators` first, then in `schema`.
    pub fn rule(&self, name: &str) -> Option<&Value> {
        self.validators
            .as_ref()
            .and_then(|v| v.get(name))
            .or_else(|| self.schema.get(name))
            .filter(|v| !v.is_null())
    }

    /// Allowed values from `schema.options` (strings or `{value}` objects).
    pub fn options(&self) -> Vec<String> {
        let Some(Value::Array(options)) = self.schema.get("options") else {
            return Vec::new();
        };
        options
            .iter()
            .filter_map(|option| match option {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("value").map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Display label, falling back to the key.
    pub fn label(&self) -> String {
        self.schema
            .get("label")
            .and_then(Value::as_str)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&self.key)
            .to_string()
    }

    pub(crate) fn apply(&mut self, patch: FieldDefinitionPatch) {
        if let Some(key) = patch.key {
            self.key = key;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(field_type) = patch.field_type {
            self.field_type = field_type;
        }
        if let Some(schema) = patch.schema {
            self.schema = schema;
        }
        if let Some(validators) = patch.validators {
            self.validators = validators;
        }
        if let Some(read_roles) = patch.read_roles {
            self.read_roles = read_roles;
        }
        if let Some(write_roles) = patch.write_roles {
            self.write_roles = write_roles;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        self.updated_at = now();
    }
}

impl Entity for FieldDefinition {
    const COLLECTION: &'static str = "field_defs";

    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &str {
        &self.directory_id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.key.clone())
    }
}

/// Body of `POST /field-defs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFieldDefinition {
    pub directory_id: Id,
    pub key: String,
    #[serde(default = "default_kind")]
    pub kind: FieldKind,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default = "empty_object")]
    pub schema: Value,
    #[serde(default)]
    pub validators: Option<Value>,
    #[serde(default)]
    pub read_roles: Vec<String>,
    #[serde(default)]
    pub write_roles: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub category_id: Option<Id>,
}

fn default_kind() -> FieldKind {
    FieldKind::Primitive
}

impl NewFieldDefinition {
    pub(crate) fn into_definition(self) -> FieldDefinition {
        let timestamp = now();
        FieldDefinition {
            id: new_id(),
            directory_id: self.directory_id,
            key: self.key,
            kind: self.kind,
            field_type: self.field_type,
            schema: self.schema,
            validators: self.validators,
            read_roles: self.read_roles,
            write_roles: self.write_roles,
            required: self.required,
            order: self.order,
            category_id: self.category_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// Body of `PATCH /field-defs/{id}`; absent members stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionPatch {
    pub key: Option<String>,
    pub kind: Option<FieldKind>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub schema: Option<Value>,
    #[serde(default, deserialize_with = "crate::types::nullable")]
    pub validators: Option<Option<Value>>,
    pub read_roles: Option<Vec<String>>,
    pub write_roles: Option<Vec<String>>,
    pub required: Option<bool>,
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "crate::types::nullable")]
    pub category_id: Option<Option<Id>>,
}
