//! Schema Store
//!
//! Per-directory field definitions and the field categories that group them
//! for display, plus the pure validation pass applied to record payloads.

pub mod category;
pub mod field;
pub mod service;
pub mod store;
pub mod validation;

pub use category::{FieldCategory, FieldCategoryPatch, FieldCategoryQuery, NewFieldCategory};
pub use field::{FieldDefinition, FieldDefinitionPatch, FieldKind, NewFieldDefinition, ValueType};
pub use service::SchemaService;
pub use store::{SchemaStore, SledSchemaStore};
pub use validation::{validate, validate_key, FieldViolation, ValidatedData};
