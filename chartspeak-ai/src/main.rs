//! chartspeak-ai - Chart Analysis Adapter
//!
//! **Module Identity:**
//! - Name: chartspeak-ai
//! - Port: 5780 (default)
//!
//! Forwards uploaded chart images to the hosted generative model and returns
//! its accessible description as `{"insights": ...}`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chartspeak_common::config;
use clap::Parser;
use tokio::signal;
use tracing::info;

use chartspeak_ai::services::GeminiClient;
use chartspeak_ai::AppState;

/// Command-line arguments for chartspeak-ai
#[derive(Parser, Debug)]
#[command(name = "chartspeak-ai")]
#[command(about = "Chart analysis adapter for ChartSpeak")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config)
    #[arg(short, long, env = "CHARTSPEAK_AI_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "CHARTSPEAK_AI_BIND")]
    bind: Option<String>,

    /// Hosted model name (overrides config)
    #[arg(short, long, env = "CHARTSPEAK_MODEL")]
    model: Option<String>,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    config::init_tracing(&config::log_directives("chartspeak_ai", &toml_config.logging));
    config_source.log();

    info!("Starting chartspeak-ai (Chart Analysis Adapter)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let ai = &toml_config.ai;
    let model_name = args.model.unwrap_or_else(|| ai.model.clone());
    let port = args.port.unwrap_or(ai.port);
    let bind = args.bind.unwrap_or_else(|| ai.bind_address.clone());

    let api_key = config::resolve_api_key(&toml_config);

    let model = GeminiClient::new(
        &ai.api_base_url,
        &model_name,
        Duration::from_secs(ai.request_timeout_secs),
    )
    .context("Failed to build model client")?;
    info!("Model: {}", model.model());

    let state = AppState::new(Arc::new(model), api_key);
    let app = chartspeak_ai::build_router(state);

    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
