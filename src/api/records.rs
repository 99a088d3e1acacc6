//! `/records/{dirId}`

use super::context::AppState;
use super::extract::{Json, Path, Query};
use super::response::{created, deleted, listing, ok, Pagination};
use crate::access::Actor;
use crate::error::ApiError;
use crate::query::ListQuery;
use crate::record::{NewRecord, RecordPatch};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/records/:dir_id", get(list_records).post(create_record))
        .route(
            "/records/:dir_id/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn list_records(
    State(state): State<AppState>,
    actor: Actor,
    Path(dir_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let listing_page = state.records.list(&dir_id, &query, &actor).await?;
    let pagination = Pagination::with_page_size(
        listing_page.page,
        listing_page.page_size,
        listing_page.records.total,
    );
    Ok(listing("records", listing_page.records, pagination))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn create_record(
    State(state): State<AppState>,
    actor: Actor,
    Path(dir_id): Path<String>,
    Json(body): Json<NewRecord>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.records.create(&dir_id, body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn get_record(
    State(state): State<AppState>,
    actor: Actor,
    Path((dir_id, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.records.get(&dir_id, &id, &actor).await?))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn update_record(
    State(state): State<AppState>,
    actor: Actor,
    Path((dir_id, id)): Path<(String, String)>,
    Json(body): Json<RecordPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.records.update(&dir_id, &id, body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn delete_record(
    State(state): State<AppState>,
    actor: Actor,
    Path((dir_id, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state.records.delete(&dir_id, &id, &actor).await?;
    Ok(deleted(&id))
}
