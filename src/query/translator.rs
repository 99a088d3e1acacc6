//! Query Translator: raw list parameters to a [`QueryPlan`], checked against
//! the directory's live field list.
//!
//! Grammar:
//! - `sort`: `key[:asc|desc]` items separated by `,`
//! - `filter`: `key:op:value` or `key:value` (equality) clauses separated by `;`
//!   with `op` one of `eq ne contains gt gte lt lte`
//! - `fields`: data keys separated by `,`

use super::plan::{
    Column, FieldRef, FilterOp, FilterSpec, FilterValue, ListQuery, QueryPlan, SortDirection,
    SortSpec,
};
use super::QueryError;
use crate::schema::{FieldDefinition, ValueType};
use crate::types::PageRequest;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// How filter operands for a field are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandType {
    Text,
    Number,
    Bool,
    Timestamp,
}

impl OperandType {
    fn of_column(column: Column) -> Self {
        match column {
            Column::Id | Column::CategoryId => OperandType::Text,
            Column::CreatedAt | Column::UpdatedAt => OperandType::Timestamp,
        }
    }

    fn of_definition(definition: &FieldDefinition) -> Self {
        match definition.value_type() {
            ValueType::Number => OperandType::Number,
            ValueType::Boolean => OperandType::Bool,
            ValueType::Text
            | ValueType::TextList
            | ValueType::Relation { .. }
            | ValueType::Any => OperandType::Text,
        }
    }

    fn name(self) -> &'static str {
        match self {
            OperandType::Text => "text",
            OperandType::Number => "number",
            OperandType::Bool => "boolean",
            OperandType::Timestamp => "timestamp",
        }
    }
}

/// Field lookup for one translation.
struct FieldIndex<'a> {
    definitions: HashMap<&'a str, &'a FieldDefinition>,
}

impl<'a> FieldIndex<'a> {
    fn new(definitions: &'a [FieldDefinition]) -> Self {
        Self {
            definitions: definitions.iter().map(|d| (d.key.as_str(), d)).collect(),
        }
    }

    fn resolve(&self, name: &str) -> Option<(FieldRef, OperandType)> {
        if let Some(column) = Column::from_name(name) {
            return Some((FieldRef::Column(column), OperandType::of_column(column)));
        }
        self.definitions
            .get(name)
            .map(|d| (FieldRef::Data(d.key.clone()), OperandType::of_definition(d)))
    }
}

/// Translate raw list parameters. Performs no store access.
pub fn translate(query: &ListQuery, definitions: &[FieldDefinition]) -> Result<QueryPlan, QueryError> {
    let index = FieldIndex::new(definitions);
    let page = PageRequest::from_raw(
        query.page.as_deref(),
        query.page_size.as_deref().or(query.limit.as_deref()),
    );

    Ok(QueryPlan {
        page: page.page,
        offset: page.offset(),
        limit: page.limit,
        sort: parse_sort(query.sort.as_deref(), &index)?,
        filter: parse_filter(query.filter.as_deref(), &index)?,
        projection: parse_projection(query.fields.as_deref(), &index)?,
    })
}

fn parse_sort(raw: Option<&str>, index: &FieldIndex<'_>) -> Result<Vec<SortSpec>, QueryError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut specs = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        let (name, direction) = match item.split_once(':') {
            Some((name, dir)) => (name.trim(), Some(dir.trim())),
            None => (item, None),
        };
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => return Err(QueryError::InvalidSortDirection(other.to_string())),
        };
        let (field, _) = index
            .resolve(name)
            .ok_or_else(|| QueryError::UnknownSortField(name.to_string()))?;
        specs.push(SortSpec { field, direction });
    }
    Ok(specs)
}

fn parse_filter(raw: Option<&str>, index: &FieldIndex<'_>) -> Result<Vec<FilterSpec>, QueryError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut specs = Vec::new();
    for clause in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        let Some((name, rest)) = clause.split_once(':') else {
            return Err(QueryError::MalformedFilter(clause.to_string()));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::MalformedFilter(clause.to_string()));
        }

        // `key:value` is equality; a value may itself contain ':'.
        let (op, value) = match rest.split_once(':') {
            Some((op, value)) => match FilterOp::parse(op.trim()) {
                Some(op) => (op, value),
                None => (FilterOp::Eq, rest),
            },
            None => (FilterOp::Eq, rest),
        };

        let (field, operand_type) = index
            .resolve(name)
            .ok_or_else(|| QueryError::UnknownFilterField(name.to_string()))?;
        let value = coerce(name, operand_type, op, value)?;
        specs.push(FilterSpec { field, op, value });
    }
    Ok(specs)
}

fn coerce(name: &str, operand_type: OperandType, op: FilterOp, raw: &str) -> Result<FilterValue, QueryError> {
    let invalid = |reason: String| QueryError::InvalidFilterValue {
        field: name.to_string(),
        reason,
    };

    if op == FilterOp::Contains && operand_type != OperandType::Text {
        return Err(invalid(format!(
            "'contains' is not supported on {} fields",
            operand_type.name()
        )));
    }
    if op.is_ordering() && operand_type == OperandType::Bool {
        return Err(invalid("boolean fields only support eq and ne".to_string()));
    }

    let raw = raw.trim();
    match operand_type {
        OperandType::Text => Ok(FilterValue::Text(raw.to_string())),
        OperandType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FilterValue::Number)
            .ok_or_else(|| invalid(format!("'{}' is not a number", raw))),
        OperandType::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(FilterValue::Bool(true)),
            "false" => Ok(FilterValue::Bool(false)),
            _ => Err(invalid(format!("'{}' is not true or false", raw))),
        },
        OperandType::Timestamp => parse_timestamp(raw)
            .map(FilterValue::Timestamp)
            .ok_or_else(|| invalid(format!("'{}' is not an RFC 3339 timestamp or date", raw))),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_projection(raw: Option<&str>, index: &FieldIndex<'_>) -> Result<Option<Vec<String>>, QueryError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mut keys: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match index.resolve(name) {
            Some((FieldRef::Data(key), _)) => {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            // Fixed columns are always returned.
            Some((FieldRef::Column(_), _)) => {}
            None => return Err(QueryError::UnknownProjectionField(name.to_string())),
        }
    }
    Ok(Some(keys))
}
