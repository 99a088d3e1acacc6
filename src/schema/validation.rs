//! Pure validation of record payloads against a directory's field schema.

use super::{FieldDefinition, ValueType};
use crate::error::ApiError;
use crate::query::Column;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const MAX_KEY_LEN: usize = 40;

/// Record data that passed [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedData(Map<String, Value>);

impl ValidatedData {
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub key: String,
    pub rule: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(key: &str, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            rule,
            message: message.into(),
        }
    }

    /// Fold violations into a single `Validation` error with per-field detail.
    pub fn into_api_error(violations: Vec<FieldViolation>) -> ApiError {
        let message = match violations.as_slice() {
            [only] => only.message.clone(),
            many => format!("{} fields failed validation", many.len()),
        };
        ApiError::validation_with_detail(message, json!({ "fields": violations }))
    }
}

/// Check a field key against `^[A-Za-z_][A-Za-z0-9_]{0,39}$`. Record column
/// names are reserved, since queries resolve them before `data` keys.
pub fn validate_key(key: &str) -> Result<(), ApiError> {
    if let Some(column) = Column::from_name(key) {
        return Err(ApiError::validation(format!(
            "Field key '{}' is reserved for the record column of the same name",
            column.name()
        )));
    }
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            key.len() <= MAX_KEY_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Invalid field key '{}': must start with a letter or underscore, contain only letters, digits and underscores, and be at most {} characters",
            key, MAX_KEY_LEN
        )))
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        _ => false,
    }
}

fn number_rule(def: &FieldDefinition, name: &str) -> Option<f64> {
    def.rule(name).and_then(Value::as_f64)
}

fn check_type(def: &FieldDefinition, value: &Value) -> Option<FieldViolation> {
    let key = def.key.as_str();
    let ok = match def.value_type() {
        ValueType::Any => true,
        ValueType::Text => value.is_string(),
        ValueType::Number => value.is_number(),
        ValueType::Boolean => value.is_boolean(),
        ValueType::TextList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        ValueType::Relation { many: false } => value.is_string(),
        ValueType::Relation { many: true } => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
    };
    if ok {
        return None;
    }
    let expected = match def.value_type() {
        ValueType::Text => "a string",
        ValueType::Number => "a number",
        ValueType::Boolean => "a boolean",
        ValueType::TextList => "an array of strings",
        ValueType::Relation { many: false } => "a record id",
        ValueType::Relation { many: true } => "an array of record ids",
        ValueType::Any => "any value",
    };
    Some(FieldViolation::new(
        key,
        "type",
        format!("Field '{}' must be {}", key, expected),
    ))
}

fn check_rules(def: &FieldDefinition, value: &Value, violations: &mut Vec<FieldViolation>) {
    let key = def.key.as_str();

    let options = def.options();
    if !options.is_empty() {
        let chosen: Vec<&str> = match value {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => vec![],
        };
        if let Some(bad) = chosen.iter().find(|c| !options.iter().any(|o| o == *c)) {
            violations.push(FieldViolation::new(
                key,
                "options",
                format!("Field '{}' does not allow value '{}'", key, bad),
            ));
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = number_rule(def, "min") {
            if n < min {
                violations.push(FieldViolation::new(
                    key,
                    "min",
                    format!("Field '{}' must be at least {}", key, min),
                ));
            }
        }
        if let Some(max) = number_rule(def, "max") {
            if n > max {
                violations.push(FieldViolation::new(
                    key,
                    "max",
                    format!("Field '{}' must be at most {}", key, max),
                ));
            }
        }
    }

    if let Some(s) = value.as_str() {
        let len = s.chars().count() as f64;
        if let Some(min) = number_rule(def, "minLength") {
            if len < min {
                violations.push(FieldViolation::new(
                    key,
                    "minLength",
                    format!("Field '{}' must have at least {} characters", key, min),
                ));
            }
        }
        if let Some(max) = number_rule(def, "maxLength") {
            if len > max {
                violations.push(FieldViolation::new(
                    key,
                    "maxLength",
                    format!("Field '{}' must have at most {} characters", key, max),
                ));
            }
        }
    }
}

/// Validate `data` against `definitions`.
///
/// Read-only kinds (lookup, computed) are skipped; they are rejected earlier
/// when a client tries to write them. Keys without a definition pass through.
/// `null` is accepted for optional fields.
pub fn validate(
    definitions: &[FieldDefinition],
    data: &Map<String, Value>,
) -> Result<ValidatedData, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    for def in definitions.iter().filter(|d| !d.kind.is_read_only()) {
        let value = data.get(&def.key);
        if is_blank(value) {
            if def.required {
                violations.push(FieldViolation::new(
                    &def.key,
                    "required",
                    format!("Field '{}' is required", def.key),
                ));
            }
            continue;
        }
        let Some(value) = value else { continue };
        if let Some(violation) = check_type(def, value) {
            violations.push(violation);
            continue;
        }
        check_rules(def, value, &mut violations);
    }

    if violations.is_empty() {
        Ok(ValidatedData(data.clone()))
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, NewFieldDefinition};

    fn def(key: &str, kind: FieldKind, field_type: &str, schema: Value, required: bool) -> FieldDefinition {
        NewFieldDefinition {
            directory_id: "dir".into(),
            key: key.into(),
            kind,
            field_type: field_type.into(),
            schema,
            validators: None,
            read_roles: vec![],
            write_roles: vec![],
            required,
            order: 0,
            category_id: None,
        }
        .into_definition()
    }

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("email").is_ok());
        assert!(validate_key("_private_1").is_ok());
        assert!(validate_key(&"a".repeat(40)).is_ok());
        assert!(validate_key(&"a".repeat(41)).is_err());
        assert!(validate_key("1st").is_err());
        assert!(validate_key("first-name").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("名前").is_err());
    }

    #[test]
    fn test_column_names_are_reserved_keys() {
        for key in ["id", "createdAt", "updatedAt", "categoryId"] {
            let err = validate_key(key).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "{}", key);
        }
        assert!(validate_key("ID").is_ok());
        assert!(validate_key("created_at").is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let defs = vec![
            def("name", FieldKind::Primitive, "text", json!({}), true),
            def("email", FieldKind::Primitive, "text", json!({}), true),
        ];
        let violations = validate(&defs, &data(json!({"name": "Ann"}))).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "email");
        assert_eq!(violations[0].rule, "required");

        let err = FieldViolation::into_api_error(violations);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.detail().unwrap()["fields"][0]["key"], "email");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let defs = vec![def("tags", FieldKind::Primitive, "tags", json!({}), true)];
        assert!(validate(&defs, &data(json!({"tags": []}))).is_err());
        let defs = vec![def("name", FieldKind::Primitive, "text", json!({}), true)];
        assert!(validate(&defs, &data(json!({"name": "  "}))).is_err());
        assert!(validate(&defs, &data(json!({"name": null}))).is_err());
    }

    #[test]
    fn test_type_and_rule_checks() {
        let defs = vec![
            def("age", FieldKind::Primitive, "number", json!({"min": 0, "max": 150}), false),
            def("active", FieldKind::Primitive, "boolean", json!({}), false),
            def("status", FieldKind::Primitive, "select", json!({"options": ["open", "closed"]}), false),
            def("code", FieldKind::Primitive, "text", json!({"minLength": 2, "maxLength": 4}), false),
            def("owner", FieldKind::Relation, "relation_one", json!({}), false),
            def("members", FieldKind::Relation, "relation_many", json!({}), false),
        ];

        let ok = json!({
            "age": 30, "active": true, "status": "open", "code": "AB",
            "owner": "rec-1", "members": ["rec-2", "rec-3"], "extra": {"kept": true}
        });
        let validated = validate(&defs, &data(ok.clone())).unwrap();
        assert_eq!(Value::Object(validated.into_inner()), ok);

        let bad = json!({
            "age": 200, "active": "yes", "status": "pending", "code": "ABCDE",
            "owner": ["rec-1"], "members": "rec-2"
        });
        let rules: Vec<&str> = validate(&defs, &data(bad))
            .unwrap_err()
            .iter()
            .map(|v| v.rule)
            .collect();
        assert_eq!(rules, vec!["max", "type", "options", "maxLength", "type", "type"]);
    }

    #[test]
    fn test_read_only_kinds_are_skipped() {
        let defs = vec![def("total", FieldKind::Computed, "number", json!({}), true)];
        assert!(validate(&defs, &data(json!({}))).is_ok());
    }

    #[test]
    fn test_validators_override_schema_hints() {
        let mut d = def("score", FieldKind::Primitive, "number", json!({"max": 10}), false);
        d.validators = Some(json!({"max": 5}));
        assert!(validate(&[d], &data(json!({"score": 7}))).is_err());
    }
}
