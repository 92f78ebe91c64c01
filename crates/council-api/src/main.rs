//! Council API server entry point.

use std::sync::Arc;

use council_api::config::ApiConfig;
use council_api::error::AppError;
use council_api::routes;
use council_api::state::{AppState, rng_factory};
use council_core::clock::SystemClock;
use council_core::rng::SystemRng;
use council_event_store::FileEventRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Council API server");

    let config = ApiConfig::from_env()?;
    let addr = config.socket_addr()?;

    let app_state = AppState::new(
        Arc::new(SystemClock),
        rng_factory(SystemRng::from_entropy),
        Arc::new(FileEventRepository::new(config.paths.clone())),
    );

    // TODO: Replace CorsLayer::permissive() with an allow-list once a browser client is served.
    let app = routes::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(%addr, root = %config.paths.root().display(), "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
