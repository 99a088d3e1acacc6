//! Shared handler state and its wiring from config.

use crate::access::{AccessChecker, ConfigAccessPolicy};
use crate::category::{CategoryService, CategoryTreeStore, SledCategoryTreeStore};
use crate::config::AinoConfig;
use crate::directory::{DirectoryService, DirectoryStore, SledDirectoryStore};
use crate::error::ApiError;
use crate::module::ModuleRegistry;
use crate::record::{RecordService, RecordStore, SledRecordStore};
use crate::schema::{SchemaService, SchemaStore, SledSchemaStore};
use crate::store::Database;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub directories: DirectoryService,
    pub schema: SchemaService,
    pub categories: CategoryService,
    pub records: RecordService,
    /// Read-mostly after bootstrap.
    pub modules: Arc<RwLock<ModuleRegistry>>,
    pub config: Arc<AinoConfig>,
    pub database: Database,
}

impl AppState {
    /// Open the stores in `database` and build every service from `config`.
    pub fn new(config: AinoConfig, database: Database) -> Result<Self, ApiError> {
        let directory_store: Arc<dyn DirectoryStore> = Arc::new(SledDirectoryStore::new(&database)?);
        let schema_store: Arc<dyn SchemaStore> = Arc::new(SledSchemaStore::new(&database)?);
        let category_store: Arc<dyn CategoryTreeStore> =
            Arc::new(SledCategoryTreeStore::new(&database)?);
        let record_store: Arc<dyn RecordStore> = Arc::new(SledRecordStore::new(&database)?);
        let access: Arc<dyn AccessChecker> = Arc::new(ConfigAccessPolicy::new(config.access.clone()));

        let modules = Arc::new(RwLock::new(ModuleRegistry::from_config(&config)?));
        tracing::info!(modules = modules.read().len(), access = ?config.access.mode, "services ready");

        Ok(Self {
            directories: DirectoryService::new(
                directory_store.clone(),
                schema_store.clone(),
                category_store.clone(),
                record_store.clone(),
                modules.clone(),
                access.clone(),
                Duration::from_millis(config.server.enrichment_timeout_ms),
            ),
            schema: SchemaService::new(schema_store.clone(), directory_store.clone(), access.clone()),
            categories: CategoryService::new(
                category_store.clone(),
                directory_store.clone(),
                record_store.clone(),
                access.clone(),
            ),
            records: RecordService::new(
                record_store,
                schema_store,
                category_store,
                directory_store,
                access,
            ),
            modules,
            config: Arc::new(config),
            database,
        })
    }
}
