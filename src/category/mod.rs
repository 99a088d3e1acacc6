//! Record Categories
//!
//! Per-directory classification tree for records, stored as a flat arena of
//! rows with `parentId` back-references and write-time `path`/`level`.

mod model;
pub mod service;
pub mod store;
pub mod tree;

pub use model::{
    NewRecordCategory, RecordCategory, RecordCategoryPatch, RecordCategoryQuery, PATH_SEPARATOR,
    ROOT_LEVEL,
};
pub use service::CategoryService;
pub use store::{CategoryTreeStore, SledCategoryTreeStore};
pub use tree::{build_tree, CategoryNode};
