//! Error types
//!
//! `StorageError` covers the embedded store, `ApiError` is the taxonomy every
//! service operation reports and the HTTP layer serializes.

use crate::query::QueryError;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by the sled-backed collections.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A unique index entry already exists for the given key.
    #[error("unique key already taken: {0}")]
    UniqueViolation(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Service-level error taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input, or data that does not match the field schema.
    #[error("{message}")]
    Validation {
        message: String,
        detail: Option<Value>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Name already exists: {0}")]
    DuplicateName(String),

    #[error("Field key already exists: {0}")]
    DuplicateKey(String),

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Unknown filter field: {0}")]
    UnknownFilterField(String),

    #[error("Invalid filter value for '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },

    #[error("Parent category not found: {0}")]
    ParentNotFound(String),

    #[error("Category {0} still has child categories")]
    HasChildren(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Validation failure without structured detail.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            detail: None,
        }
    }

    /// Validation failure carrying a structured detail object.
    pub fn validation_with_detail(message: impl Into<String>, detail: Value) -> Self {
        ApiError::Validation {
            message: message.into(),
            detail: Some(detail),
        }
    }

    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DuplicateName(_) => "DUPLICATE_NAME",
            ApiError::DuplicateKey(_) => "DUPLICATE_KEY",
            ApiError::UnknownSortField(_) => "UNKNOWN_SORT_FIELD",
            ApiError::UnknownFilterField(_) => "UNKNOWN_FILTER_FIELD",
            ApiError::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE",
            ApiError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            ApiError::HasChildren(_) => "HAS_CHILDREN",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::StorageError(_) | ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code carrying the primary error class.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. }
            | ApiError::DuplicateName(_)
            | ApiError::DuplicateKey(_)
            | ApiError::UnknownSortField(_)
            | ApiError::UnknownFilterField(_)
            | ApiError::InvalidFilterValue { .. }
            | ApiError::ParentNotFound(_)
            | ApiError::HasChildren(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::ConfigError(_) | ApiError::StorageError(_) | ApiError::Internal(_) => 500,
        }
    }

    /// Structured detail attached to the error envelope, if any.
    pub fn detail(&self) -> Option<Value> {
        match self {
            ApiError::Validation { detail, .. } => detail.clone(),
            ApiError::InvalidFilterValue { field, reason } => {
                Some(serde_json::json!({ "field": field, "reason": reason }))
            }
            _ => None,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownSortField(field) => ApiError::UnknownSortField(field),
            QueryError::UnknownFilterField(field) => ApiError::UnknownFilterField(field),
            QueryError::InvalidFilterValue { field, reason } => {
                ApiError::InvalidFilterValue { field, reason }
            }
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
