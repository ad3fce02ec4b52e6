//! HTTP server setup and routing

use crate::catalog::{EpisodeCatalog, TranscriptLinks};
use crate::error::{Error, Result};
use crate::state::SessionStore;
use crate::transcript::TranscriptPanel;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub store: SessionStore,
    pub catalog: Arc<EpisodeCatalog>,
    pub links: Arc<TranscriptLinks>,
    pub transcript: Arc<TranscriptPanel>,
    pub port: u16,
}

/// Build the router with every endpoint attached
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))

        // Episodes
        .route("/episodes", get(super::handlers::list_episodes))
        .route("/episodes/:id", get(super::handlers::get_episode))
        .route("/episodes/:id/transcript/:lang", get(super::handlers::get_transcript))

        // Playback control
        .route("/playback/state", get(super::handlers::get_playback_state))
        .route("/playback/load", post(super::handlers::load))
        .route("/playback/toggle", post(super::handlers::toggle))
        .route("/playback/seek", post(super::handlers::seek))
        .route("/playback/skip", post(super::handlers::skip))
        .route("/playback/volume", post(super::handlers::set_volume))
        .route("/playback/rate", post(super::handlers::set_rate))
        .route("/playback/close", post(super::handlers::close))

        // Transcript panel
        .route("/transcript/state", get(super::handlers::get_panel_state))
        .route("/transcript/open", post(super::handlers::open_panel))
        .route("/transcript/close", post(super::handlers::close_panel))
        .route("/transcript/language", post(super::handlers::select_language))
        .route("/transcript/scroll", post(super::handlers::report_scroll))
        .route("/transcript/metrics", post(super::handlers::set_panel_metrics))
        .route("/transcript/auto_scroll", post(super::handlers::toggle_auto_scroll))

        // SSE event stream
        .route("/events", get(super::sse::event_stream))

        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until `shutdown` resolves
pub async fn run<F>(ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.port));
    let app = create_router(ctx);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
