//! Record rows and request bodies.

use crate::query::{Cell, Column, RowFields};
use crate::store::Entity;
use crate::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One schema-less data row of a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Id,
    pub directory_id: Id,
    pub data: Map<String, Value>,
    #[serde(default)]
    pub category_id: Option<Id>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Entity for Record {
    const COLLECTION: &'static str = "records";

    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &str {
        &self.directory_id
    }
}

impl RowFields for Record {
    fn column(&self, column: Column) -> Cell<'_> {
        match column {
            Column::Id => Cell::Text(&self.id),
            Column::CreatedAt => Cell::Time(self.created_at),
            Column::UpdatedAt => Cell::Time(self.updated_at),
            Column::CategoryId => self.category_id.as_deref().map_or(Cell::Missing, Cell::Text),
        }
    }

    fn data_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Body of `POST /records/{dirId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub category_id: Option<Id>,
}

/// Body of `PUT /records/{dirId}/{id}`.
///
/// `data` is shallow-merged into the stored object: listed keys are
/// replaced (a `null` value is stored as `null`), other keys are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "crate::types::nullable")]
    pub category_id: Option<Option<Id>>,
}

/// Shallow merge of `patch` over `base`.
pub fn merge_data(base: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
