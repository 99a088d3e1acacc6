//! `/directories`

use super::context::AppState;
use super::extract::{parse_bool, required, Json, Path, Query};
use super::response::{created, deleted, listing, ok, Pagination};
use crate::access::Actor;
use crate::directory::{DirectoryPatch, DirectoryQuery, DirectoryType, NewDirectory};
use crate::error::ApiError;
use crate::types::PageRequest;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/directories", get(list_directories).post(create_directory))
        .route(
            "/directories/:id",
            get(get_directory).put(update_directory).delete(delete_directory),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    application_id: Option<String>,
    module_id: Option<String>,
    #[serde(rename = "type")]
    directory_type: Option<String>,
    is_enabled: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParams {
    application_id: Option<String>,
    module_id: Option<String>,
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn list_directories(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let directory_type = params
        .directory_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::parse::<DirectoryType>)
        .transpose()
        .map_err(ApiError::validation)?;
    let query = DirectoryQuery {
        application_id: required("applicationId", params.application_id)?,
        module_id: params.module_id.filter(|m| !m.trim().is_empty()),
        directory_type,
        is_enabled: parse_bool("isEnabled", params.is_enabled.as_deref())?,
        page: PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref()),
    };

    let page = state.directories.list(&query, &actor).await?;
    let pagination = Pagination::with_limit(query.page.page, query.page.limit, page.total);
    Ok(listing("directories", page, pagination))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn create_directory(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<CreateParams>,
    Json(body): Json<NewDirectory>,
) -> Result<impl IntoResponse, ApiError> {
    let application_id = required("applicationId", params.application_id)?;
    let module_id = required("moduleId", params.module_id)?;
    let directory = state
        .directories
        .create(body, &application_id, &module_id, &actor)
        .await?;
    Ok(created(directory))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn get_directory(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.directories.get(&id, &actor).await?))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn update_directory(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<DirectoryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.directories.update(&id, body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn delete_directory(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.directories.delete(&id, &actor).await?;
    Ok(deleted(&id))
}
