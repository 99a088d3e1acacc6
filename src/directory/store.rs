//! Directory persistence port.

use super::{Directory, DirectoryPatch, DirectoryQuery};
use crate::error::{ApiError, StorageError};
use crate::store::{Collection, Database};
use crate::types::Page;
use async_trait::async_trait;

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn create(&self, directory: Directory) -> Result<Directory, ApiError>;

    async fn get(&self, id: &str) -> Result<Option<Directory>, ApiError>;

    /// Directories matching the query ordered by `order`, then creation.
    async fn list(&self, query: &DirectoryQuery) -> Result<Page<Directory>, ApiError>;

    async fn update(&self, id: &str, patch: DirectoryPatch) -> Result<Directory, ApiError>;

    async fn delete(&self, id: &str) -> Result<bool, ApiError>;

    /// Advisory check; a concurrent create may still slip through.
    async fn check_name_exists(
        &self,
        name: &str,
        application_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, ApiError>;
}

#[derive(Clone)]
pub struct SledDirectoryStore {
    directories: Collection<Directory>,
}

impl SledDirectoryStore {
    pub fn new(db: &Database) -> Result<Self, StorageError> {
        Ok(Self {
            directories: db.collection()?,
        })
    }
}

#[async_trait]
impl DirectoryStore for SledDirectoryStore {
    async fn create(&self, directory: Directory) -> Result<Directory, ApiError> {
        self.directories.insert(&directory)?;
        Ok(directory)
    }

    async fn get(&self, id: &str) -> Result<Option<Directory>, ApiError> {
        Ok(self.directories.get(id)?)
    }

    async fn list(&self, query: &DirectoryQuery) -> Result<Page<Directory>, ApiError> {
        let mut matching: Vec<_> = self
            .directories
            .scan_scope(&query.application_id)?
            .into_iter()
            .filter(|d| query.matches(d))
            .collect();
        matching.sort_by_key(|d| d.order);
        Ok(query.page.apply(matching))
    }

    async fn update(&self, id: &str, patch: DirectoryPatch) -> Result<Directory, ApiError> {
        let mut directory = self
            .directories
            .get(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Directory {}", id)))?;
        directory.apply(patch);
        if !self.directories.replace(&directory)? {
            return Err(ApiError::NotFound(format!("Directory {}", id)));
        }
        Ok(directory)
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        Ok(self.directories.remove(id)?.is_some())
    }

    async fn check_name_exists(
        &self,
        name: &str,
        application_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, ApiError> {
        let name = name.trim();
        Ok(self
            .directories
            .scan_scope(application_id)?
            .iter()
            .any(|d| d.name == name && Some(d.id.as_str()) != exclude_id))
    }
}
