//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for control endpoints and SSE.

use crate::error::Result;
use crate::playback::PlaybackController;
use axum::{
    routing::{get, post},
    Router,
};
use chartspeak_common::events::EventBus;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub playback: Arc<PlaybackController>,
    pub events: EventBus,
    pub startup_time: DateTime<Utc>,
    /// Cancelled on shutdown; ends every open event stream
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(playback: Arc<PlaybackController>) -> Self {
        let events = playback.events().clone();
        Self {
            playback,
            events,
            startup_time: Utc::now(),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Build the router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    use super::{handlers, sse};

    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))
        // Chart data
        .route("/chart", get(handlers::get_chart))
        // Playback control
        .route("/playback/state", get(handlers::get_playback_state))
        .route("/playback/toggle", post(handlers::toggle))
        .route("/playback/play", post(handlers::play))
        .route("/playback/pause", post(handlers::pause))
        .route("/playback/reset", post(handlers::reset))
        .route("/playback/seek", post(handlers::seek))
        .route("/playback/navigate", post(handlers::navigate))
        .route("/playback/key", post(handlers::key))
        // Audio
        .route("/audio/volume", get(handlers::get_volume))
        .route("/audio/volume", post(handlers::set_volume))
        .route("/audio/mute", post(handlers::set_mute))
        // SSE event stream
        .route("/events", get(sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn run(
    addr: SocketAddr,
    ctx: AppContext,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!("Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    serve(listener, ctx, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves or
/// `ctx.shutdown` is cancelled
///
/// Graceful shutdown waits for open connections, so the signal first ends
/// the SSE streams and silences playback.
pub async fn serve(
    listener: TcpListener,
    ctx: AppContext,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let token = ctx.shutdown.clone();
    let playback = Arc::clone(&ctx.playback);
    let app = build_router(ctx);

    let signal = async move {
        tokio::select! {
            _ = shutdown => {}
            _ = token.cancelled() => {}
        }
        info!("Shutting down: closing event streams");
        token.cancel();
        playback.shutdown();
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;

    Ok(())
}
