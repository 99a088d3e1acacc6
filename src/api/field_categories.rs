//! `/field-categories`

use super::context::AppState;
use super::extract::{parse_bool, required, Json, Path, Query};
use super::response::{created, deleted, listing, ok, Pagination};
use crate::access::Actor;
use crate::error::ApiError;
use crate::schema::{FieldCategoryPatch, FieldCategoryQuery, NewFieldCategory};
use crate::types::PageRequest;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/field-categories",
            get(list_field_categories).post(create_field_category),
        )
        .route(
            "/field-categories/:id",
            get(get_field_category)
                .put(update_field_category)
                .delete(delete_field_category),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    application_id: Option<String>,
    directory_id: Option<String>,
    enabled: Option<String>,
    system: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn list_field_categories(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = FieldCategoryQuery {
        application_id: required("applicationId", params.application_id)?,
        directory_id: params.directory_id.filter(|d| !d.trim().is_empty()),
        enabled: parse_bool("enabled", params.enabled.as_deref())?,
        system: parse_bool("system", params.system.as_deref())?,
        page: PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref()),
    };
    let categories = state.schema.list_field_categories(&query, &actor).await?;
    let pagination = Pagination::with_limit(query.page.page, query.page.limit, categories.total);
    Ok(listing("categories", categories, pagination))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn create_field_category(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewFieldCategory>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.schema.create_field_category(body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn get_field_category(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.schema.get_field_category(&id, &actor).await?))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn update_field_category(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<FieldCategoryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.schema.update_field_category(&id, body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn delete_field_category(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.schema.delete_field_category(&id, &actor).await?;
    Ok(deleted(&id))
}
