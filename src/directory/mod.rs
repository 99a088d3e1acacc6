//! Directories
//!
//! Schema-carrying containers of an application, the store that keeps them
//! and the service orchestrating schema, category and record stores around
//! them.

pub mod enrich;
mod model;
pub mod service;
pub mod store;

pub use enrich::{Enricher, FieldDescriptor};
pub use model::{Directory, DirectoryPatch, DirectoryQuery, DirectoryType, NewDirectory};
pub use service::DirectoryService;
pub use store::{DirectoryStore, SledDirectoryStore};
