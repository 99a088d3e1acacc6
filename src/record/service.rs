//! Record use cases: schema validation and field-level role checks around the store.

use super::{merge_data, NewRecord, Record, RecordPatch, RecordStore};
use crate::access::{ensure_access, AccessChecker, Actor};
use crate::category::CategoryTreeStore;
use crate::directory::{Directory, DirectoryStore};
use crate::error::ApiError;
use crate::query::{translate, FieldRef, ListQuery, QueryPlan};
use crate::schema::{validate, FieldDefinition, FieldViolation, SchemaStore};
use crate::types::Page;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A page of records with the pagination it was cut with.
#[derive(Debug, Clone)]
pub struct RecordListing {
    pub records: Page<Record>,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Clone)]
pub struct RecordService {
    records: Arc<dyn RecordStore>,
    schema: Arc<dyn SchemaStore>,
    categories: Arc<dyn CategoryTreeStore>,
    directories: Arc<dyn DirectoryStore>,
    access: Arc<dyn AccessChecker>,
}

/// Reject writes to derived fields and to fields the actor may not write.
fn check_writable(
    definitions: &[FieldDefinition],
    data: &Map<String, Value>,
    actor: &Actor,
) -> Result<(), ApiError> {
    for def in definitions.iter().filter(|d| data.contains_key(&d.key)) {
        if def.kind.is_read_only() {
            return Err(ApiError::validation_with_detail(
                format!("Field '{}' is read-only", def.key),
                serde_json::json!({ "fields": [{ "key": def.key, "rule": "readOnly" }] }),
            ));
        }
        actor.verify_roles(&def.write_roles, &format!("write field '{}'", def.key))?;
    }
    Ok(())
}

/// Strip keys the actor may not read.
fn redact(mut record: Record, definitions: &[FieldDefinition], actor: &Actor) -> Record {
    for def in definitions {
        if !actor.has_any_role(&def.read_roles) {
            record.data.remove(&def.key);
        }
    }
    record
}

/// Filters and sorts may only reference keys the actor can read.
fn check_queryable(plan: &QueryPlan, definitions: &[FieldDefinition], actor: &Actor) -> Result<(), ApiError> {
    let referenced = plan
        .filter
        .iter()
        .map(|f| &f.field)
        .chain(plan.sort.iter().map(|s| &s.field));
    for field in referenced {
        let FieldRef::Data(key) = field else { continue };
        if let Some(def) = definitions.iter().find(|d| &d.key == key) {
            actor.verify_roles(&def.read_roles, &format!("query field '{}'", key))?;
        }
    }
    Ok(())
}

impl RecordService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        schema: Arc<dyn SchemaStore>,
        categories: Arc<dyn CategoryTreeStore>,
        directories: Arc<dyn DirectoryStore>,
        access: Arc<dyn AccessChecker>,
    ) -> Self {
        Self {
            records,
            schema,
            categories,
            directories,
            access,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    async fn directory(&self, id: &str) -> Result<Directory, ApiError> {
        self.directories
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Directory {}", id)))
    }

    /// Load the directory and check the actor may act on its application.
    async fn accessible_directory(&self, id: &str, actor: &Actor) -> Result<Directory, ApiError> {
        let directory = self.directory(id).await?;
        ensure_access(self.access.as_ref(), &directory.application_id, actor)?;
        Ok(directory)
    }

    async fn check_category(&self, directory: &Directory, category_id: &str) -> Result<(), ApiError> {
        if !directory.supports_category {
            return Err(ApiError::validation(format!(
                "Directory {} does not support record categories",
                directory.id
            )));
        }
        match self.categories.get(category_id).await? {
            Some(category) if category.directory_id == directory.id => Ok(()),
            _ => Err(ApiError::validation(format!(
                "Record category {} does not exist in directory {}",
                category_id, directory.id
            ))),
        }
    }

    #[tracing::instrument(skip(self, input, actor), fields(actor = %actor.id))]
    pub async fn create(
        &self,
        directory_id: &str,
        input: NewRecord,
        actor: &Actor,
    ) -> Result<Record, ApiError> {
        let directory = self.accessible_directory(directory_id, actor).await?;

        let definitions = self.schema.all_field_definitions(directory_id).await?;
        check_writable(&definitions, &input.data, actor)?;
        let data = validate(&definitions, &input.data)
            .map_err(FieldViolation::into_api_error)?
            .into_inner();
        if let Some(category_id) = &input.category_id {
            self.check_category(&directory, category_id).await?;
        }

        let record = self
            .records
            .create(directory_id, data, input.category_id)
            .await?;
        tracing::debug!(record_id = %record.id, "record created");
        Ok(redact(record, &definitions, actor))
    }

    /// Translate, execute and redact one listing page.
    #[tracing::instrument(skip(self, query, actor), fields(actor = %actor.id))]
    pub async fn list(
        &self,
        directory_id: &str,
        query: &ListQuery,
        actor: &Actor,
    ) -> Result<RecordListing, ApiError> {
        self.accessible_directory(directory_id, actor).await?;
        let definitions = self.schema.all_field_definitions(directory_id).await?;
        let plan = translate(query, &definitions)?;
        check_queryable(&plan, &definitions, actor)?;

        let records = self
            .records
            .find_many(directory_id, &plan)
            .await?
            .map(|record| redact(record, &definitions, actor));
        Ok(RecordListing {
            records,
            page: plan.page,
            page_size: plan.limit,
        })
    }

    pub async fn get(&self, directory_id: &str, id: &str, actor: &Actor) -> Result<Record, ApiError> {
        self.accessible_directory(directory_id, actor).await?;
        let definitions = self.schema.all_field_definitions(directory_id).await?;
        let record = self.records.find_by_id(directory_id, id).await?;
        Ok(redact(record, &definitions, actor))
    }

    /// Shallow-merge `patch.data`, validate the merged object and store exactly that.
    #[tracing::instrument(skip(self, patch, actor), fields(actor = %actor.id))]
    pub async fn update(
        &self,
        directory_id: &str,
        id: &str,
        patch: RecordPatch,
        actor: &Actor,
    ) -> Result<Record, ApiError> {
        let directory = self.accessible_directory(directory_id, actor).await?;
        let existing = self.records.find_by_id(directory_id, id).await?;

        let definitions = self.schema.all_field_definitions(directory_id).await?;
        if let Some(Some(category_id)) = &patch.category_id {
            self.check_category(&directory, category_id).await?;
        }

        let RecordPatch { data, category_id } = patch;
        let record = match data {
            Some(data) => {
                check_writable(&definitions, &data, actor)?;
                let merged = validate(&definitions, &merge_data(&existing.data, &data))
                    .map_err(FieldViolation::into_api_error)?
                    .into_inner();
                self.records
                    .replace_data(directory_id, id, merged, category_id)
                    .await?
            }
            None => {
                let patch = RecordPatch { data: None, category_id };
                self.records.update(directory_id, id, patch).await?
            }
        };
        Ok(redact(record, &definitions, actor))
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete(&self, directory_id: &str, id: &str, actor: &Actor) -> Result<(), ApiError> {
        self.accessible_directory(directory_id, actor).await?;
        if !self.records.delete(directory_id, id).await? {
            return Err(ApiError::NotFound(format!("Record {}", id)));
        }
        Ok(())
    }
}
