//! Record category use cases.

use super::tree::{build_tree, CategoryNode};
use super::{
    CategoryTreeStore, NewRecordCategory, RecordCategory, RecordCategoryPatch,
    RecordCategoryQuery, PATH_SEPARATOR,
};
use crate::access::{ensure_access, AccessChecker, Actor};
use crate::directory::{Directory, DirectoryStore};
use crate::error::ApiError;
use crate::record::RecordStore;
use crate::types::Page;
use std::sync::Arc;

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CategoryTreeStore>,
    directories: Arc<dyn DirectoryStore>,
    records: Arc<dyn RecordStore>,
    access: Arc<dyn AccessChecker>,
}

fn check_name(name: &str) -> Result<(), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Category name must not be empty"));
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(ApiError::validation(format!(
            "Category name '{}' must not contain '{}'",
            name, PATH_SEPARATOR
        )));
    }
    Ok(())
}

impl CategoryService {
    pub fn new(
        store: Arc<dyn CategoryTreeStore>,
        directories: Arc<dyn DirectoryStore>,
        records: Arc<dyn RecordStore>,
        access: Arc<dyn AccessChecker>,
    ) -> Self {
        Self {
            store,
            directories,
            records,
            access,
        }
    }

    pub fn store(&self) -> &Arc<dyn CategoryTreeStore> {
        &self.store
    }

    async fn directory(&self, id: &str) -> Result<Directory, ApiError> {
        self.directories
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Directory {}", id)))
    }

    #[tracing::instrument(skip(self, input, actor), fields(actor = %actor.id, directory_id = %input.directory_id))]
    pub async fn create(
        &self,
        input: NewRecordCategory,
        actor: &Actor,
    ) -> Result<RecordCategory, ApiError> {
        let directory = self.directory(&input.directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        check_name(&input.name)?;
        self.store.create(input, &directory.application_id).await
    }

    pub async fn list(
        &self,
        query: &RecordCategoryQuery,
        actor: &Actor,
    ) -> Result<Page<RecordCategory>, ApiError> {
        let directory = self.directory(&query.directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        self.store.find_many(query).await
    }

    pub async fn get(&self, id: &str, actor: &Actor) -> Result<RecordCategory, ApiError> {
        let category = self.find(id).await?;
        ensure_access(self.access.as_ref(), &category.application_id, actor)?;
        Ok(category)
    }

    async fn find(&self, id: &str) -> Result<RecordCategory, ApiError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Record category {}", id)))
    }

    /// Nested tree of one directory's categories.
    pub async fn tree(&self, directory_id: &str, actor: &Actor) -> Result<Vec<CategoryNode>, ApiError> {
        let directory = self.directory(directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        Ok(build_tree(self.store.all_in(directory_id).await?))
    }

    #[tracing::instrument(skip(self, patch, actor), fields(actor = %actor.id))]
    pub async fn update(
        &self,
        id: &str,
        patch: RecordCategoryPatch,
        actor: &Actor,
    ) -> Result<RecordCategory, ApiError> {
        let existing = self.find(id).await?;
        ensure_access(self.access.as_ref(), &existing.application_id, actor)?;
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        self.store.update(id, patch).await
    }

    /// Leaves only; records filed under the category lose their `categoryId`.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete(&self, id: &str, actor: &Actor) -> Result<(), ApiError> {
        let existing = self.find(id).await?;
        ensure_access(self.access.as_ref(), &existing.application_id, actor)?;

        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound(format!("Record category {}", id)));
        }
        let detached = self
            .records
            .clear_category(&existing.directory_id, id)
            .await?;
        tracing::info!(category_id = %id, detached, "record category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessConfig, AccessMode, ConfigAccessPolicy};
    use crate::category::SledCategoryTreeStore;
    use crate::directory::{DirectoryType, NewDirectory, SledDirectoryStore};
    use crate::record::SledRecordStore;
    use crate::store::Database;
    use serde_json::Map;
    use std::collections::HashMap;

    async fn fixture() -> (CategoryService, Directory) {
        let db = Database::temporary().unwrap();
        let directories = Arc::new(SledDirectoryStore::new(&db).unwrap());
        let directory = directories
            .create(
                NewDirectory {
                    name: "Documents".into(),
                    directory_type: DirectoryType::Category,
                    supports_category: true,
                    config: Map::new(),
                    order: 0,
                    is_enabled: true,
                }
                .into_directory("app", "core"),
            )
            .await
            .unwrap();
        let mut grants = HashMap::new();
        grants.insert("app".to_string(), vec!["alice".to_string()]);
        let service = CategoryService::new(
            Arc::new(SledCategoryTreeStore::new(&db).unwrap()),
            directories,
            Arc::new(SledRecordStore::new(&db).unwrap()),
            Arc::new(ConfigAccessPolicy::new(AccessConfig {
                mode: AccessMode::Grants,
                grants,
            })),
        );
        (service, directory)
    }

    fn node(directory: &Directory, name: &str) -> NewRecordCategory {
        NewRecordCategory {
            directory_id: directory.id.clone(),
            name: name.into(),
            parent_id: None,
            order: 0,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_reads_require_application_access() {
        let (service, directory) = fixture().await;
        let alice = Actor::new("alice", vec![]);
        let bob = Actor::new("bob", vec![]);
        let reports = service.create(node(&directory, "Reports"), &alice).await.unwrap();

        let query = RecordCategoryQuery {
            directory_id: directory.id.clone(),
            ..Default::default()
        };
        assert_eq!(service.get(&reports.id, &bob).await.unwrap_err().status_code(), 403);
        assert_eq!(service.list(&query, &bob).await.unwrap_err().status_code(), 403);
        assert_eq!(service.tree(&directory.id, &bob).await.unwrap_err().status_code(), 403);

        assert_eq!(service.get(&reports.id, &alice).await.unwrap().path, "Reports");
        assert_eq!(service.list(&query, &alice).await.unwrap().total, 1);
        assert_eq!(service.tree(&directory.id, &alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_names_with_separator_are_rejected() {
        let (service, directory) = fixture().await;
        let alice = Actor::new("alice", vec![]);
        let err = service
            .create(node(&directory, "a/b"), &alice)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
