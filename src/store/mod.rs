//! Entity Store
//!
//! Schema-agnostic persistence for every entity kind. Each kind lives in its
//! own [`Collection`], a trio of sled trees giving scoped creation-ordered
//! scans, id lookup and an optional transactional unique index.

pub mod collection;
pub mod persistence;

pub use collection::Collection;
pub use persistence::Database;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A row type that can be kept in a [`Collection`].
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Base name of the sled trees backing this entity kind.
    const COLLECTION: &'static str;

    /// Unique identifier of the row.
    fn id(&self) -> &str;

    /// Owning scope (directory id, or application id for directories).
    /// Never changes after insert.
    fn scope(&self) -> &str;

    /// Key that must be unique within the scope, if the kind has one.
    fn unique_key(&self) -> Option<String> {
        None
    }
}
