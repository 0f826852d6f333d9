//! HTTP request handlers
//!
//! Implements REST API endpoints for chart playback control. Every mutating
//! endpoint answers with the resulting playback state.

use crate::api::server::AppContext;
use crate::playback::{Direction, Key, PlaybackState};
use crate::tone;
use axum::{extract::State, http::StatusCode, Json};
use chartspeak_common::api::HealthResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: message.into(),
        }
    }
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    let message = message.into();
    warn!("Rejected request: {}", message);
    (StatusCode::BAD_REQUEST, Json(StatusResponse::error(message)))
}

/// Data point with its tone
#[derive(Debug, Serialize)]
pub struct PointInfo {
    index: usize,
    label: String,
    value: u8,
    frequency_hz: f64,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    points: Vec<PointInfo>,
    state: PlaybackState,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    index: usize,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    /// DOM `KeyboardEvent.key` value
    key: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: u8, // 0-100 user-facing scale
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u8,
    muted: bool,
}

#[derive(Debug, Deserialize)]
pub struct MuteRequest {
    muted: bool,
}

// ============================================================================
// Health + chart
// ============================================================================

/// GET /health
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(ctx.startup_time);
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "chartspeak-ap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        last_error: None,
    })
}

/// GET /chart - data points with their frequencies, plus playback state
pub async fn get_chart(State(ctx): State<AppContext>) -> Json<ChartResponse> {
    let points = ctx
        .playback
        .points()
        .iter()
        .map(|point| PointInfo {
            index: point.index,
            label: point.label.clone(),
            value: point.value,
            frequency_hz: tone::frequency_for(point),
        })
        .collect();

    Json(ChartResponse {
        points,
        state: ctx.playback.state(),
    })
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// GET /playback/state
pub async fn get_playback_state(State(ctx): State<AppContext>) -> Json<PlaybackState> {
    Json(ctx.playback.state())
}

/// POST /playback/toggle
pub async fn toggle(State(ctx): State<AppContext>) -> Json<PlaybackState> {
    ctx.playback.toggle();
    Json(ctx.playback.state())
}

/// POST /playback/play
pub async fn play(State(ctx): State<AppContext>) -> Json<PlaybackState> {
    ctx.playback.play();
    Json(ctx.playback.state())
}

/// POST /playback/pause
pub async fn pause(State(ctx): State<AppContext>) -> Json<PlaybackState> {
    ctx.playback.pause();
    Json(ctx.playback.state())
}

/// POST /playback/reset
pub async fn reset(State(ctx): State<AppContext>) -> Json<PlaybackState> {
    ctx.playback.reset();
    info!("Playback reset");
    Json(ctx.playback.state())
}

/// POST /playback/seek - jump to a data point
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Result<Json<PlaybackState>, ApiError> {
    let count = ctx.playback.points().len();
    if req.index >= count {
        return Err(bad_request(format!(
            "Index {} out of range (chart has {} points)",
            req.index, count
        )));
    }

    ctx.playback.seek(req.index);
    Ok(Json(ctx.playback.state()))
}

/// POST /playback/navigate - previous/next data point
pub async fn navigate(
    State(ctx): State<AppContext>,
    Json(req): Json<NavigateRequest>,
) -> Json<PlaybackState> {
    ctx.playback.navigate(req.direction);
    Json(ctx.playback.state())
}

/// POST /playback/key - forward a chart keyboard event
pub async fn key(
    State(ctx): State<AppContext>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<PlaybackState>, ApiError> {
    let Some(key) = Key::from_dom_key(&req.key) else {
        return Err(bad_request(format!("Unsupported key: {:?}", req.key)));
    };

    ctx.playback.handle_key(key);
    Ok(Json(ctx.playback.state()))
}

// ============================================================================
// Audio Endpoints
// ============================================================================

/// GET /audio/volume
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    let state = ctx.playback.state();
    Json(VolumeResponse {
        volume: state.volume,
        muted: state.muted,
    })
}

/// POST /audio/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<VolumeResponse>, ApiError> {
    if req.volume > 100 {
        return Err(bad_request(format!("Volume {} out of range 0-100", req.volume)));
    }

    ctx.playback.set_volume(req.volume);
    let state = ctx.playback.state();
    Ok(Json(VolumeResponse {
        volume: state.volume,
        muted: state.muted,
    }))
}

/// POST /audio/mute
pub async fn set_mute(
    State(ctx): State<AppContext>,
    Json(req): Json<MuteRequest>,
) -> Json<VolumeResponse> {
    ctx.playback.set_muted(req.muted);
    let state = ctx.playback.state();
    Json(VolumeResponse {
        volume: state.volume,
        muted: state.muted,
    })
}
