//! HTTP surface
//!
//! Axum routers for every resource, JSON envelopes and the server loop.

pub mod context;
mod directories;
pub mod extract;
mod field_categories;
mod field_defs;
mod health;
mod modules;
mod record_categories;
mod records;
pub mod response;

pub use context::AppState;

use axum::Router;
use std::future::Future;
use tower_http::trace::TraceLayer;

/// Every route, with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(directories::router())
        .merge(field_defs::router())
        .merge(field_categories::router())
        .merge(record_categories::router())
        .merge(records::router())
        .merge(modules::router())
        .layer(TraceLayer::new_for_http())
        // health checks stay out of the request trace
        .merge(health::router())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then flush the database.
pub async fn serve_with_shutdown<F>(state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind = state.config.server.bind.clone();
    let database = state.database.clone();
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %listener.local_addr()?, "aino server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    if let Err(err) = database.flush().await {
        tracing::error!(error = %err, "failed to flush database on shutdown");
    }
    tracing::info!("aino server stopped");
    Ok(())
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    serve_with_shutdown(state, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
        }
    })
    .await
}
