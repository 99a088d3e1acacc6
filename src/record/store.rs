//! Record Store: schema-agnostic rows with plan execution.

use super::{merge_data, Record, RecordPatch};
use crate::error::{ApiError, StorageError};
use crate::query::{compare_rows, matches_all, project, QueryPlan};
use crate::store::{Collection, Database};
use crate::types::{new_id, now, Page};
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(
        &self,
        directory_id: &str,
        data: Map<String, Value>,
        category_id: Option<String>,
    ) -> Result<Record, ApiError>;

    /// Filter, sort, count, then slice and project.
    async fn find_many(&self, directory_id: &str, plan: &QueryPlan) -> Result<Page<Record>, ApiError>;

    /// Fails with `NotFound` unless the record exists in this directory.
    async fn find_by_id(&self, directory_id: &str, id: &str) -> Result<Record, ApiError>;

    async fn update(&self, directory_id: &str, id: &str, patch: RecordPatch) -> Result<Record, ApiError>;

    /// Overwrite `data` wholesale; `category_id` follows patch semantics.
    async fn replace_data(
        &self,
        directory_id: &str,
        id: &str,
        data: Map<String, Value>,
        category_id: Option<Option<String>>,
    ) -> Result<Record, ApiError>;

    async fn delete(&self, directory_id: &str, id: &str) -> Result<bool, ApiError>;

    async fn count(&self, directory_id: &str) -> Result<u64, ApiError>;

    async fn delete_in(&self, directory_id: &str) -> Result<usize, ApiError>;

    /// Clear `categoryId` on every record filed under the category.
    async fn clear_category(&self, directory_id: &str, category_id: &str) -> Result<usize, ApiError>;
}

#[derive(Clone)]
pub struct SledRecordStore {
    records: Collection<Record>,
}

impl SledRecordStore {
    pub fn new(db: &Database) -> Result<Self, StorageError> {
        Ok(Self {
            records: db.collection()?,
        })
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::NotFound(format!("Record {}", id))
    }
}

#[async_trait]
impl RecordStore for SledRecordStore {
    async fn create(
        &self,
        directory_id: &str,
        data: Map<String, Value>,
        category_id: Option<String>,
    ) -> Result<Record, ApiError> {
        let timestamp = now();
        let record = Record {
            id: new_id(),
            directory_id: directory_id.to_string(),
            data,
            category_id,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.records.insert(&record)?;
        Ok(record)
    }

    async fn find_many(&self, directory_id: &str, plan: &QueryPlan) -> Result<Page<Record>, ApiError> {
        let mut matching: Vec<Record> = self
            .records
            .scan_scope(directory_id)?
            .into_iter()
            .filter(|r| matches_all(r, &plan.filter))
            .collect();
        if !plan.sort.is_empty() {
            // Stable: ties keep creation order.
            matching.sort_by(|a, b| compare_rows(a, b, &plan.sort));
        }

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(plan.offset as usize)
            .take(plan.limit as usize)
            .map(|mut record| {
                if let Some(keys) = &plan.projection {
                    record.data = project(&record.data, keys);
                }
                record
            })
            .collect();
        Ok(Page { items, total })
    }

    async fn find_by_id(&self, directory_id: &str, id: &str) -> Result<Record, ApiError> {
        self.records
            .get(id)?
            .filter(|r| r.directory_id == directory_id)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, directory_id: &str, id: &str, patch: RecordPatch) -> Result<Record, ApiError> {
        let mut record = self.find_by_id(directory_id, id).await?;
        if let Some(data) = &patch.data {
            record.data = merge_data(&record.data, data);
        }
        if let Some(category_id) = patch.category_id {
            record.category_id = category_id;
        }
        record.updated_at = now();
        if !self.records.replace(&record)? {
            return Err(Self::not_found(id));
        }
        Ok(record)
    }

    async fn replace_data(
        &self,
        directory_id: &str,
        id: &str,
        data: Map<String, Value>,
        category_id: Option<Option<String>>,
    ) -> Result<Record, ApiError> {
        let mut record = self.find_by_id(directory_id, id).await?;
        record.data = data;
        if let Some(category_id) = category_id {
            record.category_id = category_id;
        }
        record.updated_at = now();
        if !self.records.replace(&record)? {
            return Err(Self::not_found(id));
        }
        Ok(record)
    }

    async fn delete(&self, directory_id: &str, id: &str) -> Result<bool, ApiError> {
        match self.records.get(id)? {
            Some(record) if record.directory_id == directory_id => {
                Ok(self.records.remove(id)?.is_some())
            }
            _ => Ok(false),
        }
    }

    async fn count(&self, directory_id: &str) -> Result<u64, ApiError> {
        Ok(self.records.count_scope(directory_id)?)
    }

    async fn delete_in(&self, directory_id: &str) -> Result<usize, ApiError> {
        Ok(self.records.remove_scope(directory_id)?)
    }

    async fn clear_category(&self, directory_id: &str, category_id: &str) -> Result<usize, ApiError> {
        let mut cleared = 0;
        for mut record in self.records.scan_scope(directory_id)? {
            if record.category_id.as_deref() == Some(category_id) {
                record.category_id = None;
                record.updated_at = now();
                self.records.replace(&record)?;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FieldRef, FilterOp, FilterSpec, FilterValue, SortDirection, SortSpec};
    use proptest::prelude::*;
    use serde_json::json;

    fn store() -> SledRecordStore {
        SledRecordStore::new(&Database::temporary().unwrap()).unwrap()
    }

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn plan(offset: u64, limit: u64) -> QueryPlan {
        QueryPlan {
            page: offset / limit + 1,
            offset,
            limit,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_round_trip_keeps_data_and_timestamps() {
        let store = store();
        let input = data(json!({"name": "Ann", "nested": {"x": [1, 2]}}));
        let created = store.create("dir", input.clone(), None).await.unwrap();
        let fetched = store.find_by_id("dir", &created.id).await.unwrap();
        assert_eq!(fetched.data, input);
        assert_eq!(fetched.created_at, fetched.updated_at);

        assert!(matches!(
            store.find_by_id("other", &created.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_second_delete_reports_false() {
        let store = store();
        let a = store.create("dir", Map::new(), None).await.unwrap();
        store.create("dir", Map::new(), None).await.unwrap();

        assert!(store.delete("dir", &a.id).await.unwrap());
        assert!(!store.delete("dir", &a.id).await.unwrap());
        assert_eq!(store.count("dir").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_updated_at() {
        let store = store();
        let created = store
            .create("dir", data(json!({"name": "Ann", "age": 30})), Some("cat".into()))
            .await
            .unwrap();
        let patch = RecordPatch {
            data: Some(data(json!({"age": 31}))),
            category_id: Some(None),
        };
        let updated = store.update("dir", &created.id, patch).await.unwrap();
        assert_eq!(Value::Object(updated.data), json!({"name": "Ann", "age": 31}));
        assert_eq!(updated.category_id, None);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_replace_data_drops_keys_not_given() {
        let store = store();
        let created = store
            .create("dir", data(json!({"name": "Ann", "age": 30})), Some("c1".into()))
            .await
            .unwrap();
        let replaced = store
            .replace_data("dir", &created.id, data(json!({"name": "Bo"})), None)
            .await
            .unwrap();
        assert_eq!(Value::Object(replaced.data), json!({"name": "Bo"}));
        assert_eq!(replaced.category_id.as_deref(), Some("c1"));
        assert!(store
            .replace_data("other", &created.id, Map::new(), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_find_many_filters_sorts_and_projects() {
        let store = store();
        for (name, age) in [("Cid", 40), ("Ann", 30), ("Bob", 30), ("Dan", 20)] {
            store
                .create("dir", data(json!({"name": name, "age": age})), None)
                .await
                .unwrap();
        }
        let plan = QueryPlan {
            sort: vec![SortSpec {
                field: FieldRef::Data("age".into()),
                direction: SortDirection::Desc,
            }],
            filter: vec![FilterSpec {
                field: FieldRef::Data("age".into()),
                op: FilterOp::Gte,
                value: FilterValue::Number(30.0),
            }],
            projection: Some(vec!["name".into()]),
            ..Default::default()
        };
        let page = store.find_many("dir", &plan).await.unwrap();
        assert_eq!(page.total, 3);
        let names: Vec<&Value> = page.items.iter().map(|r| &r.data["name"]).collect();
        // Equal ages keep creation order.
        assert_eq!(names, vec!["Cid", "Ann", "Bob"]);
        assert!(page.items.iter().all(|r| !r.data.contains_key("age")));
    }

    #[tokio::test]
    async fn test_clear_category() {
        let store = store();
        store.create("dir", Map::new(), Some("c1".into())).await.unwrap();
        store.create("dir", Map::new(), Some("c2".into())).await.unwrap();
        assert_eq!(store.clear_category("dir", "c1").await.unwrap(), 1);

        let page = store.find_many("dir", &QueryPlan::default()).await.unwrap();
        let categories: Vec<Option<&str>> =
            page.items.iter().map(|r| r.category_id.as_deref()).collect();
        assert_eq!(categories, vec![None, Some("c2")]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_pages_partition_creation_order(total in 0usize..30, limit in 1u64..8, page in 1u64..6) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let store = store();
                for i in 0..total {
                    store.create("dir", data(json!({"n": i})), None).await.unwrap();
                }
                let offset = (page - 1) * limit;
                let result = store.find_many("dir", &plan(offset, limit)).await.unwrap();

                prop_assert_eq!(result.total, total as u64);
                let expected: Vec<u64> = (offset..(offset + limit).min(total as u64)).collect();
                let actual: Vec<u64> = result.items.iter().map(|r| r.data["n"].as_u64().unwrap()).collect();
                prop_assert_eq!(actual, expected);
                Ok(())
            })?;
        }
    }
}
