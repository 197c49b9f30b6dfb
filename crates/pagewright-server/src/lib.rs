//! HTTP intake and orchestration for the brief-to-pages deployment service.
//!
//! `POST /api/deploy` drives the whole pipeline synchronously on one worker:
//! validate → generate → publish → notify, returning the terminal outcome to
//! the caller. Concurrency comes entirely from the HTTP server's per-request
//! tasks; the only shared state is the immutable configuration and the
//! outbound clients built from it at startup.

pub mod error;
pub mod github;
pub mod notify;
pub mod pipeline;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health::health))
        .route("/api/deploy", post(routes::deploy::deploy))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the deployment API server.
pub async fn serve(state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(state, listener).await
}

/// Start the deployment API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0`
/// and the OS picks a free port).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(state);
    tracing::info!("deployment API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
