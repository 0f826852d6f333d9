//! Shared test helpers for chartspeak-ap integration tests
#![allow(dead_code)]

pub mod fake_speech;

use chartspeak_ap::audio::CaptureToneOutput;
use chartspeak_ap::PlaybackController;
use chartspeak_common::chart::demo_series;
use chartspeak_common::events::{ChartSpeakEvent, EventBus};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Controller over the demo chart with captured tones and a bus subscription
pub struct PlaybackHarness {
    pub controller: PlaybackController,
    pub tones: CaptureToneOutput,
    pub rx: broadcast::Receiver<ChartSpeakEvent>,
}

impl PlaybackHarness {
    pub fn new() -> Self {
        Self::with_controller(|controller| controller)
    }

    /// Harness whose controller is adjusted by `configure` before use
    pub fn with_controller(configure: impl FnOnce(PlaybackController) -> PlaybackController) -> Self {
        let tones = CaptureToneOutput::new();
        let events = EventBus::new(256);
        let rx = events.subscribe();
        let controller = configure(
            PlaybackController::new(demo_series(), Arc::new(tones.clone()), events).unwrap(),
        );
        Self {
            controller,
            tones,
            rx,
        }
    }

    /// Everything published since the last drain
    pub fn drain(&mut self) -> Vec<ChartSpeakEvent> {
        drain(&mut self.rx)
    }

    /// Announcements published since the last drain
    pub fn announcements(&mut self) -> Vec<String> {
        announcements(&mut self.rx)
    }
}

pub fn drain(rx: &mut broadcast::Receiver<ChartSpeakEvent>) -> Vec<ChartSpeakEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn announcements(rx: &mut broadcast::Receiver<ChartSpeakEvent>) -> Vec<String> {
    drain(rx)
        .iter()
        .filter_map(|e| e.as_announcement().map(str::to_string))
        .collect()
}

/// Let spawned tasks run without advancing time
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
