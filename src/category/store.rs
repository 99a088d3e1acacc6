//! Category Tree Store: record categories with denormalized path and level.

use super::tree::{descendants, sort_siblings, would_cycle};
use super::{NewRecordCategory, RecordCategory, RecordCategoryPatch, RecordCategoryQuery, ROOT_LEVEL};
use crate::error::{ApiError, StorageError};
use crate::store::{Collection, Database};
use crate::types::{new_id, now, Page};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait CategoryTreeStore: Send + Sync {
    /// Insert a node, deriving `path` and `level` from its parent.
    async fn create(
        &self,
        input: NewRecordCategory,
        application_id: &str,
    ) -> Result<RecordCategory, ApiError>;

    async fn get(&self, id: &str) -> Result<Option<RecordCategory>, ApiError>;

    /// Nodes matching the query ordered by `order`, then creation.
    async fn find_many(&self, query: &RecordCategoryQuery) -> Result<Page<RecordCategory>, ApiError>;

    /// Every node of one directory ordered by `order`, then creation.
    async fn all_in(&self, directory_id: &str) -> Result<Vec<RecordCategory>, ApiError>;

    /// Apply a patch, recomputing `path`/`level` for the node and its subtree.
    async fn update(&self, id: &str, patch: RecordCategoryPatch) -> Result<RecordCategory, ApiError>;

    /// Remove a leaf. Fails with `HasChildren` otherwise.
    async fn delete(&self, id: &str) -> Result<bool, ApiError>;

    async fn delete_in(&self, directory_id: &str) -> Result<usize, ApiError>;
}

#[derive(Clone)]
pub struct SledCategoryTreeStore {
    categories: Collection<RecordCategory>,
}

impl SledCategoryTreeStore {
    pub fn new(db: &Database) -> Result<Self, StorageError> {
        Ok(Self {
            categories: db.collection()?,
        })
    }

    fn resolve_parent(
        &self,
        directory_id: &str,
        parent_id: &str,
    ) -> Result<RecordCategory, ApiError> {
        match self.categories.get(parent_id)? {
            Some(parent) if parent.directory_id == directory_id => Ok(parent),
            _ => Err(ApiError::ParentNotFound(parent_id.to_string())),
        }
    }
}

#[async_trait]
impl CategoryTreeStore for SledCategoryTreeStore {
    async fn create(
        &self,
        input: NewRecordCategory,
        application_id: &str,
    ) -> Result<RecordCategory, ApiError> {
        let name = input.name.trim().to_string();
        let (path, level) = match &input.parent_id {
            Some(parent_id) => {
                let parent = self.resolve_parent(&input.directory_id, parent_id)?;
                (parent.child_path(&name), parent.level + 1)
            }
            None => (name.clone(), ROOT_LEVEL),
        };

        let timestamp = now();
        let category = RecordCategory {
            id: new_id(),
            application_id: application_id.to_string(),
            directory_id: input.directory_id,
            name,
            path,
            level,
            parent_id: input.parent_id,
            order: input.order,
            enabled: input.enabled,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.categories.insert(&category)?;
        Ok(category)
    }

    async fn get(&self, id: &str) -> Result<Option<RecordCategory>, ApiError> {
        Ok(self.categories.get(id)?)
    }

    async fn find_many(&self, query: &RecordCategoryQuery) -> Result<Page<RecordCategory>, ApiError> {
        let mut matching: Vec<_> = self
            .categories
            .scan_scope(&query.directory_id)?
            .into_iter()
            .filter(|c| query.matches(c))
            .collect();
        sort_siblings(&mut matching);
        Ok(query.page.apply(matching))
    }

    async fn all_in(&self, directory_id: &str) -> Result<Vec<RecordCategory>, ApiError> {
        let mut rows = self.categories.scan_scope(directory_id)?;
        sort_siblings(&mut rows);
        Ok(rows)
    }

    async fn update(&self, id: &str, patch: RecordCategoryPatch) -> Result<RecordCategory, ApiError> {
        let mut node = self
            .categories
            .get(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Record category {}", id)))?;
        let rows = self.categories.scan_scope(&node.directory_id)?;

        let moved = patch.parent_id.is_some() && patch.parent_id.as_ref() != Some(&node.parent_id);
        let renamed = patch.name.as_ref().is_some_and(|n| n.trim() != node.name);

        if let Some(name) = patch.name {
            node.name = name.trim().to_string();
        }
        if let Some(parent_id) = patch.parent_id {
            if let Some(parent_id) = &parent_id {
                if would_cycle(&rows, id, parent_id) {
                    return Err(ApiError::validation(format!(
                        "Category {} cannot be moved under itself or its descendant {}",
                        id, parent_id
                    )));
                }
            }
            node.parent_id = parent_id;
        }
        if let Some(order) = patch.order {
            node.order = order;
        }
        if let Some(enabled) = patch.enabled {
            node.enabled = enabled;
        }
        node.updated_at = now();

        if !(moved || renamed) {
            self.categories.replace(&node)?;
            return Ok(node);
        }

        match &node.parent_id {
            Some(parent_id) => {
                let parent = self.resolve_parent(&node.directory_id, parent_id)?;
                node.path = parent.child_path(&node.name);
                node.level = parent.level + 1;
            }
            None => {
                node.path = node.name.clone();
                node.level = ROOT_LEVEL;
            }
        }
        self.categories.replace(&node)?;

        // Rewrite the subtree top-down so every child sees its parent's new path.
        let mut by_id: HashMap<String, RecordCategory> =
            rows.into_iter().map(|c| (c.id.clone(), c)).collect();
        by_id.insert(node.id.clone(), node.clone());
        let subtree = descendants(&by_id.values().cloned().collect::<Vec<_>>(), id);
        for child_id in subtree {
            let Some(mut child) = by_id.get(&child_id).cloned() else {
                continue;
            };
            let Some(parent) = child.parent_id.as_ref().and_then(|p| by_id.get(p)) else {
                continue;
            };
            child.path = parent.child_path(&child.name);
            child.level = parent.level + 1;
            child.updated_at = node.updated_at;
            self.categories.replace(&child)?;
            by_id.insert(child_id, child);
        }
        tracing::debug!(category_id = %id, path = %node.path, "recomputed category subtree");
        Ok(node)
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let Some(node) = self.categories.get(id)? else {
            return Ok(false);
        };
        let has_children = self
            .categories
            .scan_scope(&node.directory_id)?
            .iter()
            .any(|c| c.parent_id.as_deref() == Some(id));
        if has_children {
            return Err(ApiError::HasChildren(id.to_string()));
        }
        Ok(self.categories.remove(id)?.is_some())
    }

    async fn delete_in(&self, directory_id: &str) -> Result<usize, ApiError> {
        Ok(self.categories.remove_scope(directory_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store() -> SledCategoryTreeStore {
        SledCategoryTreeStore::new(&Database::temporary().unwrap()).unwrap()
    }

    fn input(name: &str, parent: Option<&str>) -> NewRecordCategory {
        NewRecordCategory {
            directory_id: "dir".into(),
            name: name.into(),
            parent_id: parent.map(String::from),
            order: 0,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_child_level_and_path() {
        let store = store();
        let root = store.create(input("Staff", None), "app").await.unwrap();
        assert_eq!(root.level, ROOT_LEVEL);
        assert_eq!(root.path, "Staff");

        let child = store
            .create(input("Engineering", Some(&root.id)), "app")
            .await
            .unwrap();
        assert_eq!(child.level, root.level + 1);
        assert_eq!(child.path, "Staff/Engineering");

        let err = store.create(input("Lost", Some("nope")), "app").await.unwrap_err();
        assert!(matches!(err, ApiError::ParentNotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_and_move_rewrite_subtree() {
        let store = store();
        let a = store.create(input("A", None), "app").await.unwrap();
        let b = store.create(input("B", Some(&a.id)), "app").await.unwrap();
        let c = store.create(input("C", Some(&b.id)), "app").await.unwrap();
        let d = store.create(input("D", None), "app").await.unwrap();

        let rename = RecordCategoryPatch {
            name: Some("Alpha".into()),
            ..Default::default()
        };
        store.update(&a.id, rename).await.unwrap();
        assert_eq!(store.get(&c.id).await.unwrap().unwrap().path, "Alpha/B/C");

        let reparent = RecordCategoryPatch {
            parent_id: Some(Some(d.id.clone())),
            ..Default::default()
        };
        let moved = store.update(&b.id, reparent).await.unwrap();
        assert_eq!(moved.path, "D/B");
        assert_eq!(moved.level, 2);
        let c = store.get(&c.id).await.unwrap().unwrap();
        assert_eq!(c.path, "D/B/C");
        assert_eq!(c.level, 3);

        let to_root = RecordCategoryPatch {
            parent_id: Some(None),
            ..Default::default()
        };
        let root = store.update(&b.id, to_root).await.unwrap();
        assert_eq!((root.path.as_str(), root.level), ("B", ROOT_LEVEL));
    }

    #[tokio::test]
    async fn test_cycles_are_rejected() {
        let store = store();
        let a = store.create(input("A", None), "app").await.unwrap();
        let b = store.create(input("B", Some(&a.id)), "app").await.unwrap();

        let patch = RecordCategoryPatch {
            parent_id: Some(Some(b.id.clone())),
            ..Default::default()
        };
        let err = store.update(&a.id, patch).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_rejects_nodes_with_children() {
        let store = store();
        let a = store.create(input("A", None), "app").await.unwrap();
        let b = store.create(input("B", Some(&a.id)), "app").await.unwrap();

        assert!(matches!(store.delete(&a.id).await, Err(ApiError::HasChildren(_))));
        assert!(store.delete(&b.id).await.unwrap());
        assert!(!store.delete(&b.id).await.unwrap());
        assert!(store.delete(&a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_many_filters() {
        let store = store();
        let a = store.create(input("A", None), "app").await.unwrap();
        store.create(input("B", Some(&a.id)), "app").await.unwrap();
        store.create(input("C", Some(&a.id)), "app").await.unwrap();

        let roots = RecordCategoryQuery {
            directory_id: "dir".into(),
            parent_id: Some(None),
            ..Default::default()
        };
        assert_eq!(store.find_many(&roots).await.unwrap().total, 1);

        let level_two = RecordCategoryQuery {
            directory_id: "dir".into(),
            level: Some(2),
            ..Default::default()
        };
        let page = store.find_many(&level_two).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "B");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        // Each new node picks an existing node (or none) as its parent.
        #[test]
        fn prop_level_and_path_follow_parent(choices in proptest::collection::vec(proptest::option::of(0usize..16), 1..16)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let store = store();
                let mut created: Vec<RecordCategory> = Vec::new();
                for (i, choice) in choices.iter().enumerate() {
                    let parent = choice
                        .filter(|_| !created.is_empty())
                        .map(|c| created[c % created.len()].id.clone());
                    let node = store
                        .create(input(&format!("n{}", i), parent.as_deref()), "app")
                        .await
                        .unwrap();
                    created.push(node);
                }

                for node in store.all_in("dir").await.unwrap() {
                    match &node.parent_id {
                        Some(parent_id) => {
                            let parent = store.get(parent_id).await.unwrap().unwrap();
                            prop_assert_eq!(node.level, parent.level + 1);
                            prop_assert_eq!(node.path, format!("{}/{}", parent.path, node.name));
                        }
                        None => {
                            prop_assert_eq!(node.level, ROOT_LEVEL);
                            prop_assert_eq!(&node.path, &node.name);
                        }
                    }
                }
                Ok(())
            })?;
        }
    }
}
