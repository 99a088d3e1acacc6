//! Query Translator
//!
//! Turns generic list parameters into a validated [`QueryPlan`] and evaluates
//! plans over schema-less rows.

pub mod eval;
pub mod plan;
pub mod translator;

pub use eval::{compare_rows, matches_all, project, Cell, RowFields};
pub use plan::{
    Column, FieldRef, FilterOp, FilterSpec, FilterValue, ListQuery, QueryPlan, SortDirection,
    SortSpec,
};
pub use translator::translate;

use thiserror::Error;

/// Reasons a list request is rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Invalid sort direction '{0}', expected asc or desc")]
    InvalidSortDirection(String),

    #[error("Unknown filter field: {0}")]
    UnknownFilterField(String),

    #[error("Invalid filter value for '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },

    #[error("Malformed filter clause '{0}', expected key:op:value")]
    MalformedFilter(String),

    #[error("Unknown projection field: {0}")]
    UnknownProjectionField(String),
}
