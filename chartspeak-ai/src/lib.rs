//! chartspeak-ai library interface
//!
//! The analysis adapter: receives a chart image (plus an optional follow-up
//! question and conversation history), builds a prompt and forwards both to
//! the hosted generative model. Exposed as a library for integration testing.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::ChartModel;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Hosted model client
    pub model: Arc<dyn ChartModel>,
    /// Model credential; `None` makes every analysis fail with a configuration error
    pub api_key: Option<String>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(model: Arc<dyn ChartModel>, api_key: Option<String>) -> Self {
        Self {
            model,
            api_key,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember the most recent failure for `/health`
    pub async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
