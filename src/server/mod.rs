//! HTTP surface: router, shared state and the handler modules.

pub mod api;
mod error;
mod state;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

use crate::config::Config;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.static_dir.as_path());

    Router::new()
        .merge(api::llm::router())
        .merge(api::deduction::router())
        .merge(api::video::router())
        .merge(api::media::router())
        .merge(api::knowledge::router())
        .merge(api::data::router())
        .merge(api::pages::router())
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(config: &Config) -> std::io::Result<()> {
    let state = AppState::from_config(config);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    log::info!("Listening on http://{}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
