pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and by the integration tests.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        // Ingest
        .route("/ingest/{ticker}", post(routes::ingest::ingest_document))
        // Extraction and deltas
        .route("/extract/{ticker}", get(routes::extract::extract_snapshot))
        .route("/delta/{ticker}", get(routes::delta::get_delta))
        // Baselines
        .route(
            "/baselines/{ticker}/{kind}",
            get(routes::baselines::get_baseline).put(routes::baselines::put_baseline),
        )
        // Config
        .route("/config", get(routes::config::get_config))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the HTTP API on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful when `port = 0` and the
/// OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let data_dir = app_state.data_dir();
    let app = build_router(app_state);

    tracing::info!(data_dir = %data_dir.display(), "earnings API listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
