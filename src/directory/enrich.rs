//! Listing enrichment: each directory's category tree and UI field descriptors
//! are joined into `config.categories` and `config.fields`.
//!
//! Enrichment is presentational. A failed or slow read leaves an empty array
//! for that directory and is logged at warn; it never fails the listing.

use super::Directory;
use crate::category::{build_tree, CategoryNode, CategoryTreeStore};
use crate::error::ApiError;
use crate::schema::{FieldDefinition, FieldKind, SchemaStore};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// UI-ready view of a field definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub kind: FieldKind,
    pub required: bool,
    pub show_in_form: bool,
    pub show_in_list: bool,
    pub show_in_detail: bool,
    pub options: Vec<Value>,
    pub category_id: Option<String>,
    pub order: i64,
}

impl FieldDescriptor {
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        let flag = |name: &str| {
            definition
                .schema
                .get(name)
                .and_then(Value::as_bool)
                .unwrap_or(true)
        };
        let options = match definition.schema.get("options") {
            Some(Value::Array(options)) => options.clone(),
            _ => Vec::new(),
        };
        Self {
            id: definition.id.clone(),
            key: definition.key.clone(),
            label: definition.label(),
            field_type: definition.field_type.clone(),
            kind: definition.kind,
            required: definition.required,
            show_in_form: flag("showInForm"),
            show_in_list: flag("showInList"),
            show_in_detail: flag("showInDetail"),
            options,
            category_id: definition.category_id.clone(),
            order: definition.order,
        }
    }
}

#[derive(Clone)]
pub struct Enricher {
    schema: Arc<dyn SchemaStore>,
    categories: Arc<dyn CategoryTreeStore>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(
        schema: Arc<dyn SchemaStore>,
        categories: Arc<dyn CategoryTreeStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            schema,
            categories,
            timeout,
        }
    }

    /// Run one enrichment read under the timeout, degrading to empty.
    async fn bounded<T, F>(&self, directory_id: &str, what: &'static str, read: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        match tokio::time::timeout(self.timeout, read).await {
            Ok(Ok(items)) => items,
            Ok(Err(err)) => {
                tracing::warn!(directory_id, what, error = %err, "enrichment failed, using empty list");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    directory_id,
                    what,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "enrichment timed out, using empty list"
                );
                Vec::new()
            }
        }
    }

    async fn category_tree(&self, directory_id: &str) -> Vec<CategoryNode> {
        self.bounded(directory_id, "categories", async {
            Ok::<_, ApiError>(build_tree(self.categories.all_in(directory_id).await?))
        })
        .await
    }

    async fn field_descriptors(&self, directory_id: &str) -> Vec<FieldDescriptor> {
        self.bounded(directory_id, "fields", async {
            let definitions = self.schema.all_field_definitions(directory_id).await?;
            Ok::<_, ApiError>(definitions.iter().map(FieldDescriptor::from_definition).collect())
        })
        .await
    }

    /// Categories and fields are read concurrently.
    pub async fn enrich(&self, mut directory: Directory) -> Directory {
        let (categories, fields) = tokio::join!(
            self.category_tree(&directory.id),
            self.field_descriptors(&directory.id)
        );
        let to_value = |v: serde_json::Result<Value>| v.unwrap_or_else(|_| Value::Array(Vec::new()));
        directory
            .config
            .insert("categories".to_string(), to_value(serde_json::to_value(categories)));
        directory
            .config
            .insert("fields".to_string(), to_value(serde_json::to_value(fields)));
        directory
    }

    /// Enrich a page concurrently; output order matches input order.
    pub async fn enrich_all(&self, directories: Vec<Directory>) -> Vec<Directory> {
        join_all(directories.into_iter().map(|d| self.enrich(d))).await
    }
}
