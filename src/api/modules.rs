//! `/modules`: registry listing. Proxying to remote modules is not served here.

use super::context::AppState;
use super::extract::{Path, Query};
use super::response::ok;
use crate::error::ApiError;
use crate::module::{ModuleDescriptor, ModuleKind};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/modules", get(list_modules))
        .route("/modules/:id", get(get_module))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    kind: Option<ModuleKind>,
}

async fn list_modules(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let modules: Vec<ModuleDescriptor> = state
        .modules
        .read()
        .list_by_kind(params.kind)
        .into_iter()
        .cloned()
        .collect();
    ok(modules)
}

async fn get_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let module = state.modules.read().get_or_error(&id)?.clone();
    Ok(ok(module))
}
