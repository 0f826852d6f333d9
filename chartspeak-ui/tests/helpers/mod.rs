//! Shared test helpers for chartspeak-ui
#![allow(dead_code)]

use async_trait::async_trait;
use chartspeak_common::events::{ChartSpeakEvent, EventBus};
use chartspeak_ui::{AnalysisError, AnalysisRequest, ChartAnalysisService};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Minimal PNG signature + IHDR start; enough for content sniffing
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Analysis service answering from a script
#[derive(Clone, Default)]
pub struct ScriptedService {
    replies: Arc<Mutex<VecDeque<Result<String, AnalysisError>>>>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, insights: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(insights.to_string()));
        self
    }

    pub fn fail(self, error: AnalysisError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartAnalysisService for ScriptedService {
    async fn analyze(&self, request: AnalysisRequest) -> Result<String, AnalysisError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AnalysisError::NetworkError("script exhausted".to_string())))
    }
}

/// Announcements published since the last call
pub fn announcements(rx: &mut broadcast::Receiver<ChartSpeakEvent>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Some(message) = event.as_announcement() {
            out.push(message.to_string());
        }
    }
    out
}

pub fn bus() -> (EventBus, broadcast::Receiver<ChartSpeakEvent>) {
    let bus = EventBus::new(64);
    let rx = bus.subscribe();
    (bus, rx)
}
