//! `/field-defs`

use super::context::AppState;
use super::extract::{required, Json, Path, Query};
use super::response::{created, deleted, listing, ok, Pagination};
use crate::access::Actor;
use crate::error::ApiError;
use crate::schema::{FieldDefinitionPatch, NewFieldDefinition};
use crate::types::PageRequest;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/field-defs", get(list_field_defs).post(create_field_def))
        .route(
            "/field-defs/:id",
            get(get_field_def)
                .patch(update_field_def)
                .delete(delete_field_def),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    directory_id: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn list_field_defs(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let directory_id = required("directoryId", params.directory_id)?;
    let page = PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref());
    let definitions = state.schema.list_field_definitions(&directory_id, page, &actor).await?;
    let pagination = Pagination::with_limit(page.page, page.limit, definitions.total);
    Ok(listing("fieldDefs", definitions, pagination))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn create_field_def(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewFieldDefinition>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.schema.create_field_definition(body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn get_field_def(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.schema.get_field_definition(&id, &actor).await?))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn update_field_def(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<FieldDefinitionPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.schema.update_field_definition(&id, body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn delete_field_def(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.schema.delete_field_definition(&id, &actor).await?;
    Ok(deleted(&id))
}
