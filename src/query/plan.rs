//! Structured list plan produced by the translator and executed by the record store.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw list parameters as they arrive in the query string.
///
/// Everything stays a string so coercion (defaults, clamping) happens in the
/// translator rather than failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    /// Alias of `pageSize`; `pageSize` wins when both are present.
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub fields: Option<String>,
    pub filter: Option<String>,
}

/// Columns every record carries outside its `data` blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    CreatedAt,
    UpdatedAt,
    CategoryId,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::Id,
        Column::CreatedAt,
        Column::UpdatedAt,
        Column::CategoryId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::CreatedAt => "createdAt",
            Column::UpdatedAt => "updatedAt",
            Column::CategoryId => "categoryId",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// What a sort or filter clause addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Column(Column),
    Data(String),
}

impl FieldRef {
    pub fn name(&self) -> &str {
        match self {
            FieldRef::Column(column) => column.name(),
            FieldRef::Data(key) => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: FieldRef,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op.to_ascii_lowercase().as_str() {
            "eq" => Some(FilterOp::Eq),
            "ne" | "neq" => Some(FilterOp::Ne),
            "contains" | "like" => Some(FilterOp::Contains),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            _ => None,
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte)
    }
}

/// Filter operand, already coerced to the addressed field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub field: FieldRef,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Validated plan for one page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub page: u64,
    pub offset: u64,
    pub limit: u64,
    /// Empty means creation order.
    pub sort: Vec<SortSpec>,
    /// All clauses must hold.
    pub filter: Vec<FilterSpec>,
    /// Data keys to keep; fixed columns are always returned.
    pub projection: Option<Vec<String>>,
}

impl Default for QueryPlan {
    fn default() -> Self {
        let page = crate::types::PageRequest::default();
        Self {
            page: page.page,
            offset: page.offset(),
            limit: page.limit,
            sort: Vec::new(),
            filter: Vec::new(),
            projection: None,
        }
    }
}
