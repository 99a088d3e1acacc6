//! Schema store port and its sled adapter.

use super::{FieldCategory, FieldCategoryPatch, FieldCategoryQuery, FieldDefinition, FieldDefinitionPatch};
use crate::error::{ApiError, StorageError};
use crate::store::{Collection, Database};
use crate::types::{now, Page, PageRequest};
use async_trait::async_trait;

/// Durable CRUD for field definitions and field categories.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Insert a definition. Fails with `DuplicateKey` if the key exists in the directory.
    async fn create_field_definition(
        &self,
        definition: FieldDefinition,
    ) -> Result<FieldDefinition, ApiError>;

    async fn get_field_definition(&self, id: &str) -> Result<Option<FieldDefinition>, ApiError>;

    /// Every definition of a directory ordered by `order`, then creation.
    async fn all_field_definitions(
        &self,
        directory_id: &str,
    ) -> Result<Vec<FieldDefinition>, ApiError>;

    /// One page of [`SchemaStore::all_field_definitions`].
    async fn list_field_definitions(
        &self,
        directory_id: &str,
        page: PageRequest,
    ) -> Result<Page<FieldDefinition>, ApiError> {
        Ok(page.apply(self.all_field_definitions(directory_id).await?))
    }

    /// Merge a partial update. Fails with `NotFound` or `DuplicateKey`.
    async fn update_field_definition(
        &self,
        id: &str,
        patch: FieldDefinitionPatch,
    ) -> Result<FieldDefinition, ApiError>;

    /// Remove a definition. Record data keyed by it is left untouched.
    async fn delete_field_definition(&self, id: &str) -> Result<bool, ApiError>;

    async fn delete_field_definitions_in(&self, directory_id: &str) -> Result<usize, ApiError>;

    /// Clear `categoryId` on every definition pointing at the category.
    async fn detach_field_category(
        &self,
        directory_id: &str,
        category_id: &str,
    ) -> Result<usize, ApiError>;

    async fn create_field_category(&self, category: FieldCategory)
        -> Result<FieldCategory, ApiError>;

    async fn get_field_category(&self, id: &str) -> Result<Option<FieldCategory>, ApiError>;

    /// Categories matching the query ordered by `order`, then creation.
    async fn list_field_categories(
        &self,
        query: &FieldCategoryQuery,
    ) -> Result<Page<FieldCategory>, ApiError>;

    async fn update_field_category(
        &self,
        id: &str,
        patch: FieldCategoryPatch,
    ) -> Result<FieldCategory, ApiError>;

    async fn delete_field_category(&self, id: &str) -> Result<bool, ApiError>;

    async fn delete_field_categories_in(&self, directory_id: &str) -> Result<usize, ApiError>;

    /// Advisory uniqueness check for category names within (application, directory).
    async fn check_name_exists(
        &self,
        name: &str,
        application_id: &str,
        directory_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, ApiError>;
}

/// Sled-backed schema store.
#[derive(Clone)]
pub struct SledSchemaStore {
    fields: Collection<FieldDefinition>,
    categories: Collection<FieldCategory>,
}

impl SledSchemaStore {
    pub fn new(db: &Database) -> Result<Self, StorageError> {
        Ok(Self {
            fields: db.collection()?,
            categories: db.collection()?,
        })
    }

    fn duplicate_key(err: StorageError) -> ApiError {
        match err {
            StorageError::UniqueViolation(key) => ApiError::DuplicateKey(key),
            other => ApiError::StorageError(other),
        }
    }
}

#[async_trait]
impl SchemaStore for SledSchemaStore {
    async fn create_field_definition(
        &self,
        definition: FieldDefinition,
    ) -> Result<FieldDefinition, ApiError> {
        self.fields.insert(&definition).map_err(Self::duplicate_key)?;
        Ok(definition)
    }

    async fn get_field_definition(&self, id: &str) -> Result<Option<FieldDefinition>, ApiError> {
        Ok(self.fields.get(id)?)
    }

    async fn all_field_definitions(
        &self,
        directory_id: &str,
    ) -> Result<Vec<FieldDefinition>, ApiError> {
        let mut definitions = self.fields.scan_scope(directory_id)?;
        // Stable sort keeps creation order among equal `order` values.
        definitions.sort_by_key(|d| d.order);
        Ok(definitions)
    }

    async fn update_field_definition(
        &self,
        id: &str,
        patch: FieldDefinitionPatch,
    ) -> Result<FieldDefinition, ApiError> {
        let mut definition = self
            .fields
            .get(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Field definition {}", id)))?;
        definition.apply(patch);
        if !self.fields.replace(&definition).map_err(Self::duplicate_key)? {
            return Err(ApiError::NotFound(format!("Field definition {}", id)));
        }
        Ok(definition)
    }

    async fn delete_field_definition(&self, id: &str) -> Result<bool, ApiError> {
        Ok(self.fields.remove(id)?.is_some())
    }

    async fn delete_field_definitions_in(&self, directory_id: &str) -> Result<usize, ApiError> {
        Ok(self.fields.remove_scope(directory_id)?)
    }

    async fn detach_field_category(
        &self,
        directory_id: &str,
        category_id: &str,
    ) -> Result<usize, ApiError> {
        let mut detached = 0;
        for mut definition in self.fields.scan_scope(directory_id)? {
            if definition.category_id.as_deref() == Some(category_id) {
                definition.category_id = None;
                definition.updated_at = now();
                self.fields.replace(&definition)?;
                detached += 1;
            }
        }
        Ok(detached)
    }

    async fn create_field_category(
        &self,
        category: FieldCategory,
    ) -> Result<FieldCategory, ApiError> {
        self.categories.insert(&category)?;
        Ok(category)
    }

    async fn get_field_category(&self, id: &str) -> Result<Option<FieldCategory>, ApiError> {
        Ok(self.categories.get(id)?)
    }

    async fn list_field_categories(
        &self,
        query: &FieldCategoryQuery,
    ) -> Result<Page<FieldCategory>, ApiError> {
        let candidates = match &query.directory_id {
            Some(directory_id) => self.categories.scan_scope(directory_id)?,
            None => self.categories.scan_all()?,
        };
        let mut matching: Vec<_> = candidates.into_iter().filter(|c| query.matches(c)).collect();
        matching.sort_by_key(|c| c.order);
        Ok(query.page.apply(matching))
    }

    async fn update_field_category(
        &self,
        id: &str,
        patch: FieldCategoryPatch,
    ) -> Result<FieldCategory, ApiError> {
        let mut category = self
            .categories
            .get(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Field category {}", id)))?;
        category.apply(patch);
        if !self.categories.replace(&category)? {
            return Err(ApiError::NotFound(format!("Field category {}", id)));
        }
        Ok(category)
    }

    async fn delete_field_category(&self, id: &str) -> Result<bool, ApiError> {
        Ok(self.categories.remove(id)?.is_some())
    }

    async fn delete_field_categories_in(&self, directory_id: &str) -> Result<usize, ApiError> {
        Ok(self.categories.remove_scope(directory_id)?)
    }

    async fn check_name_exists(
        &self,
        name: &str,
        application_id: &str,
        directory_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, ApiError> {
        let name = name.trim();
        Ok(self
            .categories
            .scan_scope(directory_id)?
            .iter()
            .any(|c| {
                c.application_id == application_id
                    && c.name == name
                    && Some(c.id.as_str()) != exclude_id
            }))
    }
}
