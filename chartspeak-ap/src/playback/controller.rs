//! Playback controller
//!
//! Walks the chart one data point at a time. Every change of the current
//! index goes through [`Shared::set_index`], which stops the previous tone,
//! starts the new one and publishes exactly one announcement.
//!
//! Autoplay is a Tokio task ticking every [`AUTOPLAY_INTERVAL`] and wrapping
//! from the last point back to the first. The task holds a
//! [`CancellationToken`]; pausing, resetting and shutting down cancel it.

use super::types::{Direction, Key, PlaybackState};
use crate::audio::{ActiveTone, ToneOutput, ToneSpec};
use crate::error::{Error, Result};
use crate::tone::{self, TONE_DURATION};
use chartspeak_common::chart::{DataPoint, MAX_VALUE};
use chartspeak_common::events::{ChartSpeakEvent, EventBus, PlaybackStatus};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Time between data points during autoplay
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_millis(800);

/// Initial volume (0-100)
pub const DEFAULT_VOLUME: u8 = 80;

const PLAYING_MESSAGE: &str = "Playing chart audio. Each data point will play in sequence.";
const PAUSED_MESSAGE: &str = "Playback paused";
const RESET_MESSAGE: &str = "Playback reset to beginning";

struct Inner {
    status: PlaybackStatus,
    current_index: usize,
    volume: u8,
    muted: bool,
    active_tone: Option<Box<dyn ActiveTone>>,
    autoplay: Option<CancellationToken>,
}

impl Inner {
    fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            status: self.status,
            current_index: self.current_index,
            volume: self.volume,
            muted: self.muted,
        }
    }
}

struct Shared {
    points: Vec<DataPoint>,
    output: Arc<dyn ToneOutput>,
    events: EventBus,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    /// Move to `index` and emit its side effects
    ///
    /// `announcement` replaces the default point description.
    fn set_index(&self, inner: &mut Inner, index: usize, announcement: Option<&str>) {
        let index = index.min(self.last_index());
        inner.current_index = index;

        let point = &self.points[index];
        let frequency_hz = tone::frequency_for(point);

        if let Some(previous) = inner.active_tone.take() {
            previous.stop();
        }
        let spec = ToneSpec {
            frequency_hz,
            gain: inner.snapshot().gain(),
            duration: TONE_DURATION,
        };
        match self.output.start(spec) {
            Ok(handle) => inner.active_tone = Some(handle),
            Err(e) => warn!("Failed to start tone for {}: {}", point.label, e),
        }

        let timestamp = Utc::now();
        self.events.emit_lossy(ChartSpeakEvent::ToneStarted {
            index,
            label: point.label.clone(),
            value: point.value,
            frequency_hz,
            timestamp,
        });
        self.emit_state(inner);

        match announcement {
            Some(message) => self.events.announce(message),
            None => self.events.announce(tone::describe(point)),
        }
    }

    fn emit_state(&self, inner: &Inner) {
        self.events.emit_lossy(ChartSpeakEvent::PlaybackStateChanged {
            status: inner.status,
            current_index: inner.current_index,
            timestamp: Utc::now(),
        });
    }

    fn emit_volume(&self, inner: &Inner) {
        self.events.emit_lossy(ChartSpeakEvent::VolumeChanged {
            volume: inner.volume,
            muted: inner.muted,
            timestamp: Utc::now(),
        });
    }

    /// One autoplay tick; returns false once the timer was cancelled
    fn advance(&self, token: &CancellationToken) -> bool {
        let mut inner = self.lock();
        // Pause cancels under the same lock, so a late tick never moves the index
        if token.is_cancelled() {
            return false;
        }
        let next = (inner.current_index + 1) % self.points.len();
        self.set_index(&mut inner, next, None);
        true
    }
}

async fn autoplay_loop(shared: Arc<Shared>, token: CancellationToken, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if !shared.advance(&token) {
                    break;
                }
            }
        }
    }
    debug!("Autoplay timer stopped");
}

/// Chart playback state machine (`Stopped` / `Playing`)
///
/// Methods that start autoplay must be called from within a Tokio runtime.
pub struct PlaybackController {
    shared: Arc<Shared>,
    interval: Duration,
}

impl PlaybackController {
    /// Create a stopped controller positioned on the first point
    pub fn new(
        points: Vec<DataPoint>,
        output: Arc<dyn ToneOutput>,
        events: EventBus,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InvalidInput("Chart has no data points".to_string()));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                points,
                output,
                events,
                inner: Mutex::new(Inner {
                    status: PlaybackStatus::Stopped,
                    current_index: 0,
                    volume: DEFAULT_VOLUME,
                    muted: false,
                    active_tone: None,
                    autoplay: None,
                }),
            }),
            interval: AUTOPLAY_INTERVAL,
        })
    }

    /// Set the initial volume (0-100)
    pub fn with_volume(self, volume: u8) -> Self {
        self.shared.lock().volume = volume.min(MAX_VALUE);
        self
    }

    /// Override the autoplay period (at least 1 ms)
    pub fn with_autoplay_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.shared.points
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().snapshot()
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Stopped -> Playing or Playing -> Stopped
    pub fn toggle(&self) {
        let mut inner = self.shared.lock();
        match inner.status {
            PlaybackStatus::Playing => self.pause_locked(&mut inner),
            PlaybackStatus::Stopped => self.play_locked(&mut inner),
        }
    }

    /// Start autoplay; no-op if already playing
    pub fn play(&self) {
        let mut inner = self.shared.lock();
        if inner.status == PlaybackStatus::Stopped {
            self.play_locked(&mut inner);
        }
    }

    /// Stop autoplay; no-op if already stopped
    pub fn pause(&self) {
        let mut inner = self.shared.lock();
        if inner.status == PlaybackStatus::Playing {
            self.pause_locked(&mut inner);
        }
    }

    fn play_locked(&self, inner: &mut Inner) {
        inner.status = PlaybackStatus::Playing;
        // Never two timers
        if inner.autoplay.is_none() {
            let token = CancellationToken::new();
            tokio::spawn(autoplay_loop(
                Arc::clone(&self.shared),
                token.clone(),
                self.interval,
            ));
            inner.autoplay = Some(token);
        }
        info!(current_index = inner.current_index, "Autoplay started");
        self.shared.emit_state(inner);
        self.shared.events.announce(PLAYING_MESSAGE);
    }

    fn pause_locked(&self, inner: &mut Inner) {
        Self::cancel_autoplay(inner);
        inner.status = PlaybackStatus::Stopped;
        info!(current_index = inner.current_index, "Autoplay paused");
        self.shared.emit_state(inner);
        self.shared.events.announce(PAUSED_MESSAGE);
    }

    fn cancel_autoplay(inner: &mut Inner) {
        if let Some(token) = inner.autoplay.take() {
            token.cancel();
        }
    }

    /// Jump straight to a point (click or focus); out-of-range indices clamp
    pub fn seek(&self, index: usize) {
        let mut inner = self.shared.lock();
        self.shared.set_index(&mut inner, index, None);
    }

    /// Step one point, clamping at both ends
    pub fn navigate(&self, direction: Direction) {
        let mut inner = self.shared.lock();
        let index = match direction {
            Direction::Next => (inner.current_index + 1).min(self.shared.last_index()),
            Direction::Previous => inner.current_index.saturating_sub(1),
        };
        self.shared.set_index(&mut inner, index, None);
    }

    /// Keyboard handling: arrows navigate, space toggles autoplay
    pub fn handle_key(&self, key: Key) {
        match key {
            Key::ArrowLeft => self.navigate(Direction::Previous),
            Key::ArrowRight => self.navigate(Direction::Next),
            Key::Space => self.toggle(),
        }
    }

    /// Stop autoplay and return to the first point
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        Self::cancel_autoplay(&mut inner);
        inner.status = PlaybackStatus::Stopped;
        self.shared.set_index(&mut inner, 0, Some(RESET_MESSAGE));
    }

    /// Set volume (0-100) for future tones
    pub fn set_volume(&self, volume: u8) {
        let mut inner = self.shared.lock();
        let volume = volume.min(MAX_VALUE);
        info!("Volume changed: {}% -> {}%", inner.volume, volume);
        inner.volume = volume;
        self.shared.emit_volume(&inner);
    }

    pub fn set_muted(&self, muted: bool) {
        let mut inner = self.shared.lock();
        inner.muted = muted;
        info!(muted, "Mute changed");
        self.shared.emit_volume(&inner);
    }

    /// Flip mute; returns the new mute state
    pub fn toggle_mute(&self) -> bool {
        let mut inner = self.shared.lock();
        inner.muted = !inner.muted;
        info!(muted = inner.muted, "Mute changed");
        self.shared.emit_volume(&inner);
        inner.muted
    }

    /// Cancel autoplay and silence the active tone
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        Self::cancel_autoplay(&mut inner);
        inner.status = PlaybackStatus::Stopped;
        if let Some(active) = inner.active_tone.take() {
            active.stop();
        }
        debug!("Playback controller shut down");
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
