//! Sled-backed collection of JSON rows.
//!
//! Layout per collection:
//! - `<name>`: `scope ++ 0xFF ++ seq_be` -> JSON row
//! - `<name>__by_id`: id -> row key
//! - `<name>__unique`: `scope ++ 0xFF ++ unique_key` -> id
//!
//! `seq` comes from `Db::generate_id`, which is monotonic, so a prefix scan
//! over one scope yields rows in creation order. `0xFF` never appears in
//! UTF-8 and therefore cannot collide with scope bytes.

use super::Entity;
use crate::error::StorageError;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use sled::{Db, Transactional, Tree};
use std::marker::PhantomData;

const SCOPE_SEPARATOR: u8 = 0xFF;

pub struct Collection<T> {
    db: Db,
    rows: Tree,
    by_id: Tree,
    unique: Tree,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            rows: self.rows.clone(),
            by_id: self.by_id.clone(),
            unique: self.unique.clone(),
            _entity: PhantomData,
        }
    }
}

fn scope_prefix(scope: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(scope.len() + 1);
    prefix.extend_from_slice(scope.as_bytes());
    prefix.push(SCOPE_SEPARATOR);
    prefix
}

fn row_key(scope: &str, seq: u64) -> Vec<u8> {
    let mut key = scope_prefix(scope);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

fn unique_entry(scope: &str, unique_key: &str) -> Vec<u8> {
    let mut key = scope_prefix(scope);
    key.extend_from_slice(unique_key.as_bytes());
    key
}

fn transaction_error(err: TransactionError<String>) -> StorageError {
    match err {
        TransactionError::Abort(key) => StorageError::UniqueViolation(key),
        TransactionError::Storage(e) => StorageError::Sled(e),
    }
}

impl<T: Entity> Collection<T> {
    /// Open (or create) the trees backing `T` in the given database.
    pub fn open(db: &Db) -> Result<Self, StorageError> {
        Ok(Self {
            db: db.clone(),
            rows: db.open_tree(T::COLLECTION)?,
            by_id: db.open_tree(format!("{}__by_id", T::COLLECTION))?,
            unique: db.open_tree(format!("{}__unique", T::COLLECTION))?,
            _entity: PhantomData,
        })
    }

    fn decode(bytes: &[u8]) -> Result<T, StorageError> {
        serde_json::from_slice(bytes).map_err(StorageError::from)
    }

    /// Insert a new row. Fails with `UniqueViolation` if the unique key is taken.
    pub fn insert(&self, value: &T) -> Result<(), StorageError> {
        let seq = self.db.generate_id()?;
        let key = row_key(value.scope(), seq);
        let bytes = serde_json::to_vec(value)?;
        let id = value.id().as_bytes().to_vec();
        let unique = value
            .unique_key()
            .map(|k| (unique_entry(value.scope(), &k), k));

        let result: TransactionResult<(), String> = (&self.rows, &self.by_id, &self.unique)
            .transaction(|(rows, by_id, unique_tree)| {
                if let Some((entry, unique_key)) = &unique {
                    if unique_tree.get(entry.as_slice())?.is_some() {
                        return Err(ConflictableTransactionError::Abort(unique_key.clone()));
                    }
                    unique_tree.insert(entry.as_slice(), id.as_slice())?;
                }
                rows.insert(key.as_slice(), bytes.as_slice())?;
                by_id.insert(id.as_slice(), key.as_slice())?;
                Ok(())
            });
        result.map_err(transaction_error)
    }

    /// Look a row up by id.
    pub fn get(&self, id: &str) -> Result<Option<T>, StorageError> {
        let Some(key) = self.by_id.get(id.as_bytes())? else {
            return Ok(None);
        };
        match self.rows.get(&key)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Err(StorageError::Corrupt(format!(
                "{} index points at missing row for id {}",
                T::COLLECTION,
                id
            ))),
        }
    }

    /// Overwrite an existing row in place, keeping its position in the scope.
    ///
    /// Returns `false` when the id does not resolve.
    pub fn replace(&self, value: &T) -> Result<bool, StorageError> {
        let Some(key) = self.by_id.get(value.id().as_bytes())? else {
            return Ok(false);
        };
        let previous = match self.rows.get(&key)? {
            Some(bytes) => Self::decode(&bytes)?,
            None => {
                return Err(StorageError::Corrupt(format!(
                    "{} index points at missing row for id {}",
                    T::COLLECTION,
                    value.id()
                )))
            }
        };
        if previous.scope() != value.scope() {
            return Err(StorageError::Corrupt(format!(
                "{} row {} cannot change scope",
                T::COLLECTION,
                value.id()
            )));
        }

        let bytes = serde_json::to_vec(value)?;
        let id = value.id().as_bytes().to_vec();
        let old_unique = previous
            .unique_key()
            .map(|k| unique_entry(previous.scope(), &k));
        let new_unique = value
            .unique_key()
            .map(|k| (unique_entry(value.scope(), &k), k));

        let result: TransactionResult<(), String> = (&self.rows, &self.unique).transaction(
            |(rows, unique_tree)| {
                let changed = old_unique.as_ref() != new_unique.as_ref().map(|(entry, _)| entry);
                if changed {
                    if let Some((entry, unique_key)) = &new_unique {
                        if let Some(owner) = unique_tree.get(entry.as_slice())? {
                            if owner.as_ref() != id.as_slice() {
                                return Err(ConflictableTransactionError::Abort(
                                    unique_key.clone(),
                                ));
                            }
                        }
                        unique_tree.insert(entry.as_slice(), id.as_slice())?;
                    }
                    if let Some(entry) = &old_unique {
                        unique_tree.remove(entry.as_slice())?;
                    }
                }
                rows.insert(key.as_ref(), bytes.as_slice())?;
                Ok(())
            },
        );
        result.map_err(transaction_error)?;
        Ok(true)
    }

    /// Remove a row by id, returning it if it existed.
    pub fn remove(&self, id: &str) -> Result<Option<T>, StorageError> {
        let Some(value) = self.get(id)? else {
            return Ok(None);
        };
        let Some(key) = self.by_id.get(id.as_bytes())? else {
            return Ok(None);
        };
        let unique = value
            .unique_key()
            .map(|k| unique_entry(value.scope(), &k));
        let id_bytes = id.as_bytes().to_vec();

        let result: TransactionResult<bool, String> = (&self.rows, &self.by_id, &self.unique)
            .transaction(|(rows, by_id, unique_tree)| {
                // A concurrent remove may have won the race.
                if by_id.remove(id_bytes.as_slice())?.is_none() {
                    return Ok(false);
                }
                rows.remove(key.as_ref())?;
                if let Some(entry) = &unique {
                    unique_tree.remove(entry.as_slice())?;
                }
                Ok(true)
            });
        let removed = result.map_err(transaction_error)?;
        Ok(removed.then_some(value))
    }

    /// All rows of one scope, in creation order.
    pub fn scan_scope(&self, scope: &str) -> Result<Vec<T>, StorageError> {
        self.rows
            .scan_prefix(scope_prefix(scope))
            .values()
            .map(|bytes| Self::decode(&bytes?))
            .collect()
    }

    /// Every row of the collection, grouped by scope, creation order within a scope.
    pub fn scan_all(&self) -> Result<Vec<T>, StorageError> {
        self.rows
            .iter()
            .values()
            .map(|bytes| Self::decode(&bytes?))
            .collect()
    }

    /// Number of rows in one scope.
    pub fn count_scope(&self, scope: &str) -> Result<u64, StorageError> {
        let mut count = 0;
        for entry in self.rows.scan_prefix(scope_prefix(scope)).keys() {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Remove every row of one scope, returning how many were removed.
    pub fn remove_scope(&self, scope: &str) -> Result<usize, StorageError> {
        let mut removed = 0;
        for value in self.scan_scope(scope)? {
            if self.remove(value.id())?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
