//! Database handle: opens the sled database and hands out collections.

use super::{Collection, Entity};
use crate::config::StorageConfig;
use crate::error::StorageError;
use std::path::Path;

/// Owner of the sled database for the whole process.
#[derive(Clone)]
pub struct Database {
    db: sled::Db,
}

impl Database {
    /// Open an on-disk database, creating the directory if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        tracing::info!(path = %path.display(), "opened sled database");
        Ok(Self { db })
    }

    /// Open a throwaway database that is removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Open according to the storage configuration.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.temporary {
            tracing::warn!("storage.temporary is set, data will not survive a restart");
            return Self::temporary();
        }
        let path = config.resolve_data_dir().map_err(|e| {
            StorageError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;
        Self::open(&path)
    }

    /// Collection for entity kind `T`.
    pub fn collection<T: Entity>(&self) -> Result<Collection<T>, StorageError> {
        Collection::open(&self.db)
    }

    /// Flush dirty pages to disk.
    pub async fn flush(&self) -> Result<usize, StorageError> {
        Ok(self.db.flush_async().await?)
    }
}
