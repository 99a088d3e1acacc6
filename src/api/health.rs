use super::context::AppState;
use super::response::ok;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::json;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "modules": state.modules.read().len(),
    }))
}
