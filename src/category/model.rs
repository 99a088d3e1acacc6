//! Record category rows.

use crate::store::Entity;
use crate::types::{Id, PageRequest, Timestamp};
use serde::{Deserialize, Serialize};

/// Level of a category without a parent.
pub const ROOT_LEVEL: u32 = 1;

pub const PATH_SEPARATOR: char = '/';

/// Node of a directory's record classification tree.
///
/// `path` and `level` are denormalized from the ancestors at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCategory {
    pub id: Id,
    pub application_id: String,
    pub directory_id: Id,
    pub name: String,
    pub path: String,
    pub level: u32,
    #[serde(default)]
    pub parent_id: Option<Id>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

impl RecordCategory {
    /// Path of a child named `name` under this category.
    pub fn child_path(&self, name: &str) -> String {
        format!("{}{}{}", self.path, PATH_SEPARATOR, name)
    }
}

impl Entity for RecordCategory {
    const COLLECTION: &'static str = "record_categories";

    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &str {
        &self.directory_id
    }
}

/// Body of `POST /record-categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecordCategory {
    pub directory_id: Id,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Id>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Body of `PUT /record-categories/{id}`. `parentId: null` moves the node to the root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCategoryPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::types::nullable")]
    pub parent_id: Option<Option<Id>>,
    pub order: Option<i64>,
    pub enabled: Option<bool>,
}

/// Filters for `GET /record-categories`.
#[derive(Debug, Clone, Default)]
pub struct RecordCategoryQuery {
    pub directory_id: Id,
    pub application_id: Option<String>,
    pub level: Option<u32>,
    /// `Some(None)` selects root nodes.
    pub parent_id: Option<Option<Id>>,
    pub enabled: Option<bool>,
    pub page: PageRequest,
}

impl RecordCategoryQuery {
    pub fn matches(&self, category: &RecordCategory) -> bool {
        category.directory_id == self.directory_id
            && self
                .application_id
                .as_ref()
                .map_or(true, |a| *a == category.application_id)
            && self.level.map_or(true, |l| l == category.level)
            && self
                .parent_id
                .as_ref()
                .map_or(true, |p| *p == category.parent_id)
            && self.enabled.map_or(true, |e| e == category.enabled)
    }
}
