//! Success and error envelopes.

use crate::error::ApiError;
use crate::types::{total_pages, Page};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// List metadata. Records report `pageSize`, other listings `limit`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn with_limit(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit: Some(limit),
            page_size: None,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    pub fn with_page_size(page: u64, page_size: u64, total: u64) -> Self {
        Self {
            page,
            limit: None,
            page_size: Some(page_size),
            total,
            total_pages: total_pages(total, page_size),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
        pagination: None,
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// `{success, data: {<name>: [...]}, pagination}`
pub fn listing<T: Serialize>(
    name: &'static str,
    page: Page<T>,
    pagination: Pagination,
) -> Json<ApiResponse<BTreeMap<&'static str, Vec<T>>>> {
    Json(ApiResponse {
        success: true,
        data: BTreeMap::from([(name, page.items)]),
        pagination: Some(pagination),
    })
}

/// `{success, data: {id, deleted: true}}`
pub fn deleted(id: &str) -> Json<ApiResponse<serde_json::Value>> {
    ok(json!({ "id": id, "deleted": true }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = ?self, code = self.code(), "internal server error");
        }

        let mut body = json!({
            "success": false,
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Some(detail) = self.detail() {
            body["detail"] = detail;
        }
        (status, Json(body)).into_response()
    }
}
