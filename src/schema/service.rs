//! Field definition and field category use cases.

use super::{
    validate_key, FieldCategory, FieldCategoryPatch, FieldCategoryQuery, FieldDefinition,
    FieldDefinitionPatch, FieldKind, NewFieldCategory, NewFieldDefinition, SchemaStore,
};
use crate::access::{ensure_access, AccessChecker, Actor};
use crate::directory::{Directory, DirectoryStore};
use crate::error::ApiError;
use crate::types::{Page, PageRequest};
use std::sync::Arc;

#[derive(Clone)]
pub struct SchemaService {
    store: Arc<dyn SchemaStore>,
    directories: Arc<dyn DirectoryStore>,
    access: Arc<dyn AccessChecker>,
}

fn check_kind_and_type(kind: FieldKind, field_type: &str) -> Result<(), ApiError> {
    let field_type = field_type.trim().to_ascii_lowercase();
    if field_type.is_empty() {
        return Err(ApiError::validation("Field type must not be empty"));
    }
    let is_relation_type = field_type.starts_with("relation");
    match (kind, is_relation_type) {
        (FieldKind::Relation, false) => Err(ApiError::validation(format!(
            "Relation fields need a relation type (relation_one, relation_many), got '{}'",
            field_type
        ))),
        (FieldKind::Relation, true) => Ok(()),
        (_, true) => Err(ApiError::validation(format!(
            "Type '{}' is only valid for relation fields",
            field_type
        ))),
        _ => Ok(()),
    }
}

impl SchemaService {
    pub fn new(
        store: Arc<dyn SchemaStore>,
        directories: Arc<dyn DirectoryStore>,
        access: Arc<dyn AccessChecker>,
    ) -> Self {
        Self {
            store,
            directories,
            access,
        }
    }

    pub fn store(&self) -> &Arc<dyn SchemaStore> {
        &self.store
    }

    async fn directory(&self, id: &str) -> Result<Directory, ApiError> {
        self.directories
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Directory {}", id)))
    }

    /// A field may only reference a category of its own directory.
    async fn check_field_category(&self, directory_id: &str, category_id: &str) -> Result<(), ApiError> {
        match self.store.get_field_category(category_id).await? {
            Some(category) if category.directory_id == directory_id => Ok(()),
            Some(_) => Err(ApiError::validation(format!(
                "Field category {} belongs to another directory",
                category_id
            ))),
            None => Err(ApiError::validation(format!(
                "Field category {} does not exist",
                category_id
            ))),
        }
    }

    // --- field definitions ---

    #[tracing::instrument(skip(self, input, actor), fields(actor = %actor.id, directory_id = %input.directory_id, key = %input.key))]
    pub async fn create_field_definition(
        &self,
        input: NewFieldDefinition,
        actor: &Actor,
    ) -> Result<FieldDefinition, ApiError> {
        let directory = self.directory(&input.directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        validate_key(&input.key)?;
        check_kind_and_type(input.kind, &input.field_type)?;
        if let Some(category_id) = &input.category_id {
            self.check_field_category(&directory.id, category_id).await?;
        }

        let definition = self
            .store
            .create_field_definition(input.into_definition())
            .await?;
        tracing::info!(field_id = %definition.id, "field definition created");
        Ok(definition)
    }

    pub async fn list_field_definitions(
        &self,
        directory_id: &str,
        page: PageRequest,
        actor: &Actor,
    ) -> Result<Page<FieldDefinition>, ApiError> {
        let directory = self.directory(directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        self.store.list_field_definitions(directory_id, page).await
    }

    pub async fn get_field_definition(&self, id: &str, actor: &Actor) -> Result<FieldDefinition, ApiError> {
        let definition = self.find_field_definition(id).await?;
        let directory = self.directory(&definition.directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        Ok(definition)
    }

    async fn find_field_definition(&self, id: &str) -> Result<FieldDefinition, ApiError> {
        self.store
            .get_field_definition(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Field definition {}", id)))
    }

    #[tracing::instrument(skip(self, patch, actor), fields(actor = %actor.id))]
    pub async fn update_field_definition(
        &self,
        id: &str,
        patch: FieldDefinitionPatch,
        actor: &Actor,
    ) -> Result<FieldDefinition, ApiError> {
        let existing = self.find_field_definition(id).await?;
        let directory = self.directory(&existing.directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;

        if let Some(key) = &patch.key {
            validate_key(key)?;
        }
        check_kind_and_type(
            patch.kind.unwrap_or(existing.kind),
            patch.field_type.as_deref().unwrap_or(&existing.field_type),
        )?;
        if let Some(Some(category_id)) = &patch.category_id {
            self.check_field_category(&directory.id, category_id).await?;
        }

        self.store.update_field_definition(id, patch).await
    }

    /// Record values stored under the key are left in place.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_field_definition(&self, id: &str, actor: &Actor) -> Result<(), ApiError> {
        let existing = self.find_field_definition(id).await?;
        let directory = self.directory(&existing.directory_id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;

        if !self.store.delete_field_definition(id).await? {
            return Err(ApiError::NotFound(format!("Field definition {}", id)));
        }
        tracing::info!(field_id = %id, key = %existing.key, "field definition deleted");
        Ok(())
    }

    // --- field categories ---

    #[tracing::instrument(skip(self, input, actor), fields(actor = %actor.id, directory_id = %input.directory_id))]
    pub async fn create_field_category(
        &self,
        input: NewFieldCategory,
        actor: &Actor,
    ) -> Result<FieldCategory, ApiError> {
        let directory = self.directory(&input.directory_id).await?;
        if directory.application_id != input.application_id {
            return Err(ApiError::validation(format!(
                "Directory {} does not belong to application {}",
                directory.id, input.application_id
            )));
        }
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Category name must not be empty"));
        }
        if self
            .store
            .check_name_exists(name, &input.application_id, &input.directory_id, None)
            .await?
        {
            return Err(ApiError::DuplicateName(name.to_string()));
        }

        self.store.create_field_category(input.into_category()).await
    }

    pub async fn list_field_categories(
        &self,
        query: &FieldCategoryQuery,
        actor: &Actor,
    ) -> Result<Page<FieldCategory>, ApiError> {
        ensure_access(self.access.as_ref(), &query.application_id, actor)?;
        self.store.list_field_categories(query).await
    }

    pub async fn get_field_category(&self, id: &str, actor: &Actor) -> Result<FieldCategory, ApiError> {
        let category = self.find_field_category(id).await?;
        ensure_access(self.access.as_ref(), &category.application_id, actor)?;
        Ok(category)
    }

    async fn find_field_category(&self, id: &str) -> Result<FieldCategory, ApiError> {
        self.store
            .get_field_category(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Field category {}", id)))
    }

    #[tracing::instrument(skip(self, patch, actor), fields(actor = %actor.id))]
    pub async fn update_field_category(
        &self,
        id: &str,
        mut patch: FieldCategoryPatch,
        actor: &Actor,
    ) -> Result<FieldCategory, ApiError> {
        let existing = self.find_field_category(id).await?;
        ensure_access(self.access.as_ref(), &existing.application_id, actor)?;

        if let Some(name) = patch.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::validation("Category name must not be empty"));
            }
            if name != existing.name
                && self
                    .store
                    .check_name_exists(&name, &existing.application_id, &existing.directory_id, Some(id))
                    .await?
            {
                return Err(ApiError::DuplicateName(name));
            }
            patch.name = Some(name);
        }

        self.store.update_field_category(id, patch).await
    }

    /// System categories stay; fields of a deleted category are detached.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_field_category(&self, id: &str, actor: &Actor) -> Result<(), ApiError> {
        let existing = self.find_field_category(id).await?;
        ensure_access(self.access.as_ref(), &existing.application_id, actor)?;
        if existing.system {
            return Err(ApiError::validation(format!(
                "System category '{}' cannot be deleted",
                existing.name
            )));
        }

        let detached = self
            .store
            .detach_field_category(&existing.directory_id, id)
            .await?;
        if !self.store.delete_field_category(id).await? {
            return Err(ApiError::NotFound(format!("Field category {}", id)));
        }
        tracing::info!(category_id = %id, detached, "field category deleted");
        Ok(())
    }
}
