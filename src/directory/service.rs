//! Directory Service: directory CRUD plus the cross-entity rules no single
//! store can enforce (access, registered module, unique name, cascade).

use super::{Directory, DirectoryPatch, DirectoryQuery, DirectoryStore, Enricher, NewDirectory};
use crate::access::{ensure_access, AccessChecker, Actor};
use crate::category::CategoryTreeStore;
use crate::error::ApiError;
use crate::module::ModuleRegistry;
use crate::record::RecordStore;
use crate::schema::SchemaStore;
use crate::types::Page;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn DirectoryStore>,
    schema: Arc<dyn SchemaStore>,
    categories: Arc<dyn CategoryTreeStore>,
    records: Arc<dyn RecordStore>,
    modules: Arc<RwLock<ModuleRegistry>>,
    access: Arc<dyn AccessChecker>,
    enricher: Enricher,
}

impl DirectoryService {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        schema: Arc<dyn SchemaStore>,
        categories: Arc<dyn CategoryTreeStore>,
        records: Arc<dyn RecordStore>,
        modules: Arc<RwLock<ModuleRegistry>>,
        access: Arc<dyn AccessChecker>,
        enrichment_timeout: Duration,
    ) -> Self {
        let enricher = Enricher::new(schema.clone(), categories.clone(), enrichment_timeout);
        Self {
            store,
            schema,
            categories,
            records,
            modules,
            access,
            enricher,
        }
    }

    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    async fn load(&self, id: &str) -> Result<Directory, ApiError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Directory {}", id)))
    }

    #[tracing::instrument(skip(self, input, actor), fields(actor = %actor.id))]
    pub async fn create(
        &self,
        input: NewDirectory,
        application_id: &str,
        module_id: &str,
        actor: &Actor,
    ) -> Result<Directory, ApiError> {
        if application_id.trim().is_empty() || module_id.trim().is_empty() {
            return Err(ApiError::validation("applicationId and moduleId are required"));
        }
        ensure_access(self.access.as_ref(), application_id, actor)?;
        self.modules.read().get_or_error(module_id)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Directory name must not be empty"));
        }
        if self.store.check_name_exists(name, application_id, None).await? {
            return Err(ApiError::DuplicateName(name.to_string()));
        }

        let directory = self
            .store
            .create(input.into_directory(application_id, module_id))
            .await?;
        tracing::info!(directory_id = %directory.id, name = %directory.name, "directory created");
        Ok(directory)
    }

    /// One page of directories, each enriched with its categories and fields.
    #[tracing::instrument(skip(self, query, actor), fields(actor = %actor.id, application_id = %query.application_id))]
    pub async fn list(&self, query: &DirectoryQuery, actor: &Actor) -> Result<Page<Directory>, ApiError> {
        if query.application_id.trim().is_empty() {
            return Err(ApiError::validation("applicationId is required"));
        }
        ensure_access(self.access.as_ref(), &query.application_id, actor)?;

        let page = self.store.list(query).await?;
        let items = self.enricher.enrich_all(page.items).await;
        Ok(Page {
            items,
            total: page.total,
        })
    }

    pub async fn get(&self, id: &str, actor: &Actor) -> Result<Directory, ApiError> {
        let directory = self.load(id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        Ok(self.enricher.enrich(directory).await)
    }

    #[tracing::instrument(skip(self, patch, actor), fields(actor = %actor.id))]
    pub async fn update(
        &self,
        id: &str,
        mut patch: DirectoryPatch,
        actor: &Actor,
    ) -> Result<Directory, ApiError> {
        let existing = self.load(id).await?;
        ensure_access(self.access.as_ref(), &existing.application_id, actor)?;

        if let Some(name) = patch.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::validation("Directory name must not be empty"));
            }
            if name != existing.name
                && self
                    .store
                    .check_name_exists(&name, &existing.application_id, Some(id))
                    .await?
            {
                return Err(ApiError::DuplicateName(name));
            }
            patch.name = Some(name);
        }

        self.store.update(id, patch).await
    }

    /// Removes the directory together with everything it owns.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete(&self, id: &str, actor: &Actor) -> Result<(), ApiError> {
        let existing = self.load(id).await?;
        ensure_access(self.access.as_ref(), &existing.application_id, actor)?;

        let records = self.records.delete_in(id).await?;
        let categories = self.categories.delete_in(id).await?;
        let fields = self.schema.delete_field_definitions_in(id).await?;
        let field_categories = self.schema.delete_field_categories_in(id).await?;
        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound(format!("Directory {}", id)));
        }
        tracing::info!(
            directory_id = %id,
            records,
            categories,
            fields,
            field_categories,
            "directory deleted"
        );
        Ok(())
    }
}
