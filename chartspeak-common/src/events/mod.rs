//! Event types and EventBus
//!
//! Provides shared event definitions and the EventBus used by every
//! ChartSpeak component to publish status changes. Announcements on the bus
//! play the role of a screen-reader live region: each one is a complete,
//! human-readable status line.

mod playback_types;

pub use playback_types::{PlaybackStatus, SpeechStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// ChartSpeak event types
///
/// Events are broadcast via EventBus and serialized (tagged by `type`) for
/// SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChartSpeakEvent {
    /// Accessible status message
    Announcement {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A tone was started for a data point
    ToneStarted {
        /// Data point index
        index: usize,
        /// Data point label
        label: String,
        /// Data point value (percent)
        value: u8,
        /// Tone frequency
        frequency_hz: f64,
        timestamp: DateTime<Utc>,
    },

    /// Autoplay started/stopped or the current index moved
    PlaybackStateChanged {
        status: PlaybackStatus,
        current_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Volume (0-100)
        volume: u8,
        muted: bool,
        timestamp: DateTime<Utc>,
    },

    /// Speech controller changed state
    SpeechStateChanged {
        status: SpeechStatus,
        timestamp: DateTime<Utc>,
    },
}

impl ChartSpeakEvent {
    /// Build an announcement stamped with the current time
    pub fn announcement(message: impl Into<String>) -> Self {
        ChartSpeakEvent::Announcement {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ChartSpeakEvent::Announcement { .. } => "Announcement",
            ChartSpeakEvent::ToneStarted { .. } => "ToneStarted",
            ChartSpeakEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            ChartSpeakEvent::VolumeChanged { .. } => "VolumeChanged",
            ChartSpeakEvent::SpeechStateChanged { .. } => "SpeechStateChanged",
        }
    }

    /// Announcement text, if this is an announcement
    pub fn as_announcement(&self) -> Option<&str> {
        match self {
            ChartSpeakEvent::Announcement { message, .. } => Some(message),
            _ => None,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use chartspeak_common::events::{ChartSpeakEvent, EventBus};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(ChartSpeakEvent::announcement("Playback paused"));
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.as_announcement(), Some("Playback paused"));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChartSpeakEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ChartSpeakEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ChartSpeakEvent,
    ) -> Result<usize, broadcast::error::SendError<ChartSpeakEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ChartSpeakEvent) {
        let _ = self.tx.send(event);
    }

    /// Publish an accessible status message
    pub fn announce(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "Announcement");
        self.emit_lossy(ChartSpeakEvent::announcement(message));
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
