//! HTTP surface: the rendered page, the two synthesis triggers and audio file serving.

mod auth;
mod page;
mod routes;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::tts::Synthesizer;

/// Name under which the submit-on-enter trigger is exposed as a callable API.
pub const NAMED_API: &str = "tts";

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub synthesizer: Arc<Synthesizer>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api", get(routes::api_info))
        // Submit-on-enter: the named callable route
        .route(page::NAMED_ROUTE, post(routes::synthesize))
        // Button click: same handler, not advertised
        .route(page::BUTTON_ROUTE, post(routes::synthesize))
        .route("/file/{name}", get(routes::audio_file))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_login))
        .with_state(state)
}

/// Bind the listener and serve until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let addr = state.config.bind_addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Listening on http://{}", listener.local_addr().context("Failed to read local address")?);

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await.context("HTTP server error")?;
    Ok(())
}
