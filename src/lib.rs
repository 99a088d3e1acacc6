//! Aino: Low-Code Directories and Dynamic Records
//!
//! Applications own directories; each directory carries a schema of field
//! definitions (grouped by field categories), an optional tree of record
//! categories and the records themselves. Everything persists in an embedded
//! sled database and is served over a JSON HTTP API.

pub mod access;
pub mod api;
pub mod category;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod module;
pub mod query;
pub mod record;
pub mod schema;
pub mod store;
pub mod tooling;
pub mod types;

pub use error::{ApiError, StorageError};
pub use types::{Id, Page, PageRequest, Timestamp};
