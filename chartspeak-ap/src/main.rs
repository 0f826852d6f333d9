//! chartspeak-ap - Chart audio player
//!
//! **Module Identity:**
//! - Name: chartspeak-ap
//! - Port: 5781 (default)
//!
//! Serves the sonified demonstration chart: playback control over HTTP and
//! a live SSE feed of announcements and tones.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chartspeak_common::chart::demo_series;
use chartspeak_common::config;
use chartspeak_common::events::EventBus;
use clap::Parser;
use tokio::signal;
use tracing::info;

use chartspeak_ap::api::{self, AppContext};
use chartspeak_ap::audio::{ToneOutput, TracingToneOutput};
use chartspeak_ap::PlaybackController;

/// Command-line arguments for chartspeak-ap
#[derive(Parser, Debug)]
#[command(name = "chartspeak-ap")]
#[command(about = "Chart audio player for ChartSpeak")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config)
    #[arg(short, long, env = "CHARTSPEAK_AP_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "CHARTSPEAK_AP_BIND")]
    bind: Option<String>,

    /// Initial volume 0-100 (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Audio output device name (default device if omitted)
    #[arg(long, env = "CHARTSPEAK_AUDIO_DEVICE")]
    device: Option<String>,

    /// Log tones instead of playing them
    #[arg(long)]
    silent: bool,

    /// Print the audio output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    config::init_tracing(&config::log_directives("chartspeak_ap", &toml_config.logging));
    config_source.log();

    if args.list_devices {
        return print_devices();
    }

    info!("Starting chartspeak-ap (Chart Audio Player)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let player = &toml_config.player;
    let port = args.port.unwrap_or(player.port);
    let bind = args.bind.unwrap_or_else(|| player.bind_address.clone());
    let volume = args.volume.unwrap_or(player.volume);

    let output = open_tone_output(args.silent, args.device);
    let events = EventBus::default();
    let playback = Arc::new(
        PlaybackController::new(demo_series(), output, events)
            .context("Failed to initialize playback controller")?
            .with_volume(volume)
            .with_autoplay_interval(Duration::from_millis(player.autoplay_interval_ms)),
    );
    info!(
        points = playback.points().len(),
        volume, "Playback controller initialized"
    );

    let ctx = AppContext::new(Arc::clone(&playback));

    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;
    info!("Health check: http://{}/health", addr);
    info!("Event stream: http://{}/events", addr);

    api::run(addr, ctx, shutdown_signal())
        .await
        .context("Server error")?;

    playback.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

#[cfg(feature = "cpal-output")]
fn print_devices() -> Result<()> {
    let devices = chartspeak_ap::audio::CpalToneOutput::list_devices()
        .context("Failed to list audio devices")?;
    if devices.is_empty() {
        println!("No audio output devices found");
    }
    for name in devices {
        println!("{name}");
    }
    Ok(())
}

#[cfg(not(feature = "cpal-output"))]
fn print_devices() -> Result<()> {
    anyhow::bail!("Built without the cpal-output feature; no audio devices available")
}

/// Pick the tone sink: audio device when compiled in, otherwise log only
#[cfg(feature = "cpal-output")]
fn open_tone_output(silent: bool, device: Option<String>) -> Arc<dyn ToneOutput> {
    use chartspeak_ap::audio::CpalToneOutput;

    if silent {
        return Arc::new(TracingToneOutput::new());
    }
    match CpalToneOutput::open(device) {
        Ok(output) => Arc::new(output),
        Err(e) => {
            tracing::warn!("Audio output unavailable ({}), logging tones instead", e);
            Arc::new(TracingToneOutput::new())
        }
    }
}

#[cfg(not(feature = "cpal-output"))]
fn open_tone_output(_silent: bool, device: Option<String>) -> Arc<dyn ToneOutput> {
    if let Some(device) = device {
        tracing::warn!(
            "Built without the cpal-output feature, ignoring audio device '{}'",
            device
        );
    }
    Arc::new(TracingToneOutput::new())
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
