//! `/record-categories`

use super::context::AppState;
use super::extract::{parse_bool, required, Json, Path, Query};
use super::response::{created, deleted, listing, ok, Pagination};
use crate::access::Actor;
use crate::category::{NewRecordCategory, RecordCategoryPatch, RecordCategoryQuery};
use crate::error::ApiError;
use crate::types::PageRequest;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/record-categories",
            get(list_record_categories).post(create_record_category),
        )
        .route("/record-categories/tree", get(record_category_tree))
        .route(
            "/record-categories/:id",
            get(get_record_category)
                .put(update_record_category)
                .delete(delete_record_category),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    application_id: Option<String>,
    directory_id: Option<String>,
    enabled: Option<String>,
    level: Option<String>,
    /// `null` or `root` selects top-level nodes.
    parent_id: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeParams {
    directory_id: Option<String>,
}

fn parent_filter(raw: Option<String>) -> Option<Option<String>> {
    let raw = raw?;
    match raw.trim() {
        "" => None,
        "null" | "root" => Some(None),
        id => Some(Some(id.to_string())),
    }
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn list_record_categories(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let level = params
        .level
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            l.parse::<u32>()
                .map_err(|_| ApiError::validation(format!("level must be a positive integer, got '{}'", l)))
        })
        .transpose()?;
    let query = RecordCategoryQuery {
        directory_id: required("directoryId", params.directory_id)?,
        application_id: params.application_id.filter(|a| !a.trim().is_empty()),
        level,
        parent_id: parent_filter(params.parent_id),
        enabled: parse_bool("enabled", params.enabled.as_deref())?,
        page: PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref()),
    };
    let categories = state.categories.list(&query, &actor).await?;
    let pagination = Pagination::with_limit(query.page.page, query.page.limit, categories.total);
    Ok(listing("categories", categories, pagination))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn record_category_tree(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<TreeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let directory_id = required("directoryId", params.directory_id)?;
    let tree = state.categories.tree(&directory_id, &actor).await?;
    Ok(ok(json!({ "directoryId": directory_id, "categories": tree })))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn create_record_category(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewRecordCategory>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.categories.create(body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn get_record_category(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.categories.get(&id, &actor).await?))
}

#[tracing::instrument(skip(state, actor, body), fields(actor = %actor.id))]
async fn update_record_category(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<RecordCategoryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.categories.update(&id, body, &actor).await?))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.id))]
async fn delete_record_category(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(&id, &actor).await?;
    Ok(deleted(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_filter() {
        assert_eq!(parent_filter(None), None);
        assert_eq!(parent_filter(Some("".into())), None);
        assert_eq!(parent_filter(Some("null".into())), Some(None));
        assert_eq!(parent_filter(Some("c1".into())), Some(Some("c1".into())));
    }
}
