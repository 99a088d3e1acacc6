//! Plan evaluation over schema-less rows: filter matching, ordering, projection.

use super::plan::{Column, FieldRef, FilterOp, FilterSpec, FilterValue, SortDirection, SortSpec};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Access to the addressable parts of a row.
pub trait RowFields {
    fn column(&self, column: Column) -> Cell<'_>;

    fn data_value(&self, key: &str) -> Option<&Value>;

    fn cell(&self, field: &FieldRef) -> Cell<'_> {
        match field {
            FieldRef::Column(column) => self.column(*column),
            FieldRef::Data(key) => self.data_value(key).map_or(Cell::Missing, Cell::Json),
        }
    }
}

/// One addressed value of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Missing,
    Text(&'a str),
    Time(DateTime<Utc>),
    Json(&'a Value),
}

impl<'a> Cell<'a> {
    fn is_null(&self) -> bool {
        matches!(self, Cell::Missing | Cell::Json(Value::Null))
    }

    fn text(&self) -> Option<Cow<'a, str>> {
        match *self {
            Cell::Text(t) => Some(Cow::Borrowed(t)),
            Cell::Json(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
            Cell::Json(v @ (Value::Number(_) | Value::Bool(_))) => Some(Cow::Owned(v.to_string())),
            Cell::Time(t) => Some(Cow::Owned(t.to_rfc3339())),
            _ => None,
        }
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        match *self {
            Cell::Time(t) => Some(t),
            Cell::Json(Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Rank used to order values of different JSON types.
    fn rank(&self) -> u8 {
        match self {
            Cell::Missing | Cell::Json(Value::Null) => 0,
            Cell::Json(Value::Bool(_)) => 1,
            Cell::Json(Value::Number(_)) => 2,
            Cell::Text(_) | Cell::Json(Value::String(_)) => 3,
            Cell::Time(_) => 4,
            Cell::Json(_) => 5,
        }
    }
}

fn compare_operand(cell: Cell<'_>, operand: &FilterValue) -> Option<Ordering> {
    if cell.is_null() {
        return None;
    }
    match operand {
        FilterValue::Text(expected) => cell.text().map(|t| str::cmp(&t, expected)),
        FilterValue::Number(expected) => match cell {
            Cell::Json(Value::Number(n)) => n.as_f64().and_then(|n| n.partial_cmp(expected)),
            _ => None,
        },
        FilterValue::Bool(expected) => match cell {
            Cell::Json(Value::Bool(b)) => Some(b.cmp(expected)),
            _ => None,
        },
        FilterValue::Timestamp(expected) => cell.time().map(|t| t.cmp(expected)),
    }
}

fn test(op: FilterOp, operand: &FilterValue, cell: Cell<'_>) -> bool {
    if op == FilterOp::Contains {
        return match (operand, cell.text()) {
            (FilterValue::Text(needle), Some(haystack)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => false,
        };
    }
    let ordering = compare_operand(cell, operand);
    match op {
        FilterOp::Eq => ordering == Some(Ordering::Equal),
        FilterOp::Ne => ordering != Some(Ordering::Equal),
        FilterOp::Gt => ordering == Some(Ordering::Greater),
        FilterOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => ordering == Some(Ordering::Less),
        FilterOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Contains => false,
    }
}

impl FilterSpec {
    /// Arrays match when any element does; `ne` requires that no element is equal.
    pub fn matches(&self, row: &impl RowFields) -> bool {
        let cell = row.cell(&self.field);
        if let Cell::Json(Value::Array(items)) = cell {
            let any = |op| items.iter().any(|item| test(op, &self.value, Cell::Json(item)));
            return match self.op {
                FilterOp::Ne => !any(FilterOp::Eq),
                op => any(op),
            };
        }
        test(self.op, &self.value, cell)
    }
}

/// True when the row satisfies every clause.
pub fn matches_all(row: &impl RowFields, filters: &[FilterSpec]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn compare_cells(a: Cell<'_>, b: Cell<'_>) -> Ordering {
    let (rank_a, rank_b) = (a.rank(), b.rank());
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Cell::Json(Value::Bool(x)), Cell::Json(Value::Bool(y))) => x.cmp(y),
        (Cell::Json(Value::Number(x)), Cell::Json(Value::Number(y))) => x
            .as_f64()
            .zip(y.as_f64())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .unwrap_or(Ordering::Equal),
        (Cell::Time(x), Cell::Time(y)) => x.cmp(&y),
        (Cell::Json(x @ (Value::Array(_) | Value::Object(_))), Cell::Json(y)) => {
            x.to_string().cmp(&y.to_string())
        }
        (x, y) => match (x.text(), y.text()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        },
    }
}

/// Order two rows by the sort specs. Nulls sort first ascending.
pub fn compare_rows(a: &impl RowFields, b: &impl RowFields, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ordering = compare_cells(a.cell(&spec.field), b.cell(&spec.field));
        let ordering = match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Keep only `keys` of `data`, in their original order.
pub fn project(data: &Map<String, Value>, keys: &[String]) -> Map<String, Value> {
    data.iter()
        .filter(|(k, _)| keys.contains(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
