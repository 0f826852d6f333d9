//! Speech controller
//!
//! State machine:
//!
//! ```text
//! Idle --play--> Speaking --pause--> Paused --resume--> Speaking
//! Speaking|Paused --stop--> Idle        Speaking --finished/error--> Idle
//! ```
//!
//! At most one utterance is active. Engine events reach the controller over
//! a channel drained by a background task; events naming any utterance other
//! than the active one are ignored.

use super::engine::{EngineEvent, SpeechEngine, Utterance, UtteranceHandle};
use super::markup::strip_markup;
use chartspeak_common::chat::{ChatMessage, Role};
use chartspeak_common::events::{ChartSpeakEvent, EventBus, SpeechStatus};
use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Speaking rate used for insights
pub const SPEECH_RATE: f32 = 0.9;

/// Voice pitch used for insights
pub const SPEECH_PITCH: f32 = 1.0;

/// Snapshot of the speech controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeechState {
    pub status: SpeechStatus,
    /// Which assistant message `toggle` reads
    pub message_index: usize,
    pub muted: bool,
}

struct ActiveUtterance {
    id: Uuid,
    handle: Box<dyn UtteranceHandle>,
}

struct Inner {
    status: SpeechStatus,
    message_index: usize,
    muted: bool,
    active: Option<ActiveUtterance>,
}

impl Inner {
    fn volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            1.0
        }
    }
}

struct Shared {
    engine: Arc<dyn SpeechEngine>,
    events: EventBus,
    engine_tx: mpsc::UnboundedSender<EngineEvent>,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, inner: &mut Inner, status: SpeechStatus) {
        inner.status = status;
        self.events.emit_lossy(ChartSpeakEvent::SpeechStateChanged {
            status,
            timestamp: Utc::now(),
        });
    }

    fn handle_engine_event(&self, event: EngineEvent) {
        let mut inner = self.lock();

        let current = inner.active.as_ref().map(|active| active.id);
        if current != Some(event.utterance_id()) {
            debug!(utterance = %event.utterance_id(), "Ignoring event from inactive utterance");
            return;
        }

        match event {
            EngineEvent::Started(_) => {
                self.events.announce("Started reading insights");
            }
            EngineEvent::Finished(_) => {
                inner.active = None;
                self.set_status(&mut inner, SpeechStatus::Idle);
                self.events.announce("Finished reading insights");
            }
            EngineEvent::Error { message, .. } => {
                warn!("Speech synthesis error: {}", message);
                inner.active = None;
                self.set_status(&mut inner, SpeechStatus::Idle);
            }
        }
    }
}

async fn pump_engine_events(
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            event = rx.recv() => match event {
                Some(event) => shared.handle_engine_event(event),
                None => break,
            },
        }
    }
}

/// Reads insights aloud
///
/// Must be created within a Tokio runtime.
pub struct SpeechController {
    shared: Arc<Shared>,
    pump: CancellationToken,
}

impl SpeechController {
    pub fn new(engine: Arc<dyn SpeechEngine>, events: EventBus) -> Self {
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            engine,
            events,
            engine_tx,
            inner: Mutex::new(Inner {
                status: SpeechStatus::Idle,
                message_index: 0,
                muted: false,
                active: None,
            }),
        });

        let pump = CancellationToken::new();
        tokio::spawn(pump_engine_events(
            Arc::clone(&shared),
            engine_rx,
            pump.clone(),
        ));

        Self { shared, pump }
    }

    pub fn state(&self) -> SpeechState {
        let inner = self.shared.lock();
        SpeechState {
            status: inner.status,
            message_index: inner.message_index,
            muted: inner.muted,
        }
    }

    /// Choose which assistant message `toggle` reads next
    pub fn set_message_index(&self, index: usize) {
        self.shared.lock().message_index = index;
    }

    /// Speak `text`
    ///
    /// No-op while speaking; resumes when paused.
    pub fn play(&self, text: &str) {
        let mut inner = self.shared.lock();
        match inner.status {
            SpeechStatus::Speaking => debug!("Already speaking, ignoring play"),
            SpeechStatus::Paused => self.resume_locked(&mut inner),
            SpeechStatus::Idle => self.speak_locked(&mut inner, text),
        }
    }

    /// Play/pause button: pause, resume, or read the selected assistant message
    pub fn toggle(&self, messages: &[ChatMessage]) {
        let mut inner = self.shared.lock();
        match inner.status {
            SpeechStatus::Speaking => self.pause_locked(&mut inner),
            SpeechStatus::Paused => self.resume_locked(&mut inner),
            SpeechStatus::Idle => {
                let assistant: Vec<&ChatMessage> = messages
                    .iter()
                    .filter(|m| m.role == Role::Assistant)
                    .collect();
                let Some(message) = assistant
                    .get(inner.message_index)
                    .or_else(|| assistant.first())
                else {
                    debug!("No assistant message to read");
                    return;
                };
                let text = message.content.clone();
                self.speak_locked(&mut inner, &text);
            }
        }
    }

    pub fn pause(&self) {
        let mut inner = self.shared.lock();
        if inner.status == SpeechStatus::Speaking {
            self.pause_locked(&mut inner);
        }
    }

    pub fn resume(&self) {
        let mut inner = self.shared.lock();
        if inner.status == SpeechStatus::Paused {
            self.resume_locked(&mut inner);
        }
    }

    /// Cancel speech and rewind to the first message; no-op when idle
    pub fn stop(&self) {
        let mut inner = self.shared.lock();
        if inner.status == SpeechStatus::Idle {
            return;
        }
        if let Some(active) = inner.active.take() {
            active.handle.cancel();
        }
        inner.message_index = 0;
        self.shared.set_status(&mut inner, SpeechStatus::Idle);
        info!("Speech stopped");
        self.shared.events.announce("Speech stopped and reset");
    }

    pub fn set_muted(&self, muted: bool) {
        let mut inner = self.shared.lock();
        self.set_muted_locked(&mut inner, muted);
    }

    /// Flip mute; returns the new mute state
    pub fn toggle_mute(&self) -> bool {
        let mut inner = self.shared.lock();
        let muted = !inner.muted;
        self.set_muted_locked(&mut inner, muted);
        muted
    }

    /// Apply an engine event directly
    pub fn handle_engine_event(&self, event: EngineEvent) {
        self.shared.handle_engine_event(event);
    }

    /// Cancel the active utterance and stop listening for engine events
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        if let Some(active) = inner.active.take() {
            active.handle.cancel();
        }
        inner.status = SpeechStatus::Idle;
        self.pump.cancel();
    }

    fn speak_locked(&self, inner: &mut Inner, text: &str) {
        if let Some(previous) = inner.active.take() {
            previous.handle.cancel();
        }

        let text = strip_markup(text);
        if text.trim().is_empty() {
            debug!("Nothing to speak");
            return;
        }

        // Mute applies before the engine ever sees the utterance
        let utterance = Utterance {
            id: Uuid::new_v4(),
            text,
            rate: SPEECH_RATE,
            pitch: SPEECH_PITCH,
            volume: inner.volume(),
        };
        let id = utterance.id;

        match self.shared.engine.speak(utterance, self.shared.engine_tx.clone()) {
            Ok(handle) => {
                inner.active = Some(ActiveUtterance { id, handle });
                self.shared.set_status(inner, SpeechStatus::Speaking);
                info!(utterance = %id, "Speech started");
            }
            Err(e) => {
                warn!("Speech engine refused utterance: {}", e);
                self.shared.set_status(inner, SpeechStatus::Idle);
            }
        }
    }

    fn pause_locked(&self, inner: &mut Inner) {
        if let Some(active) = &inner.active {
            active.handle.pause();
        }
        self.shared.set_status(inner, SpeechStatus::Paused);
        self.shared.events.announce("Speech paused");
    }

    fn resume_locked(&self, inner: &mut Inner) {
        if let Some(active) = &inner.active {
            active.handle.resume();
        }
        self.shared.set_status(inner, SpeechStatus::Speaking);
        self.shared.events.announce("Speech resumed");
    }

    fn set_muted_locked(&self, inner: &mut Inner, muted: bool) {
        inner.muted = muted;
        if let Some(active) = &inner.active {
            active.handle.set_volume(inner.volume());
        }
        self.shared
            .events
            .announce(if muted { "Muted" } else { "Unmuted" });
    }
}

impl Drop for SpeechController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
