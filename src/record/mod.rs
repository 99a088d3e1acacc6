//! Records
//!
//! Schema-less data rows of a directory, the store that executes list plans
//! over them and the service enforcing the directory's field schema.

mod model;
pub mod service;
pub mod store;

pub use model::{merge_data, NewRecord, Record, RecordPatch};
pub use service::{RecordListing, RecordService};
pub use store::{RecordStore, SledRecordStore};
