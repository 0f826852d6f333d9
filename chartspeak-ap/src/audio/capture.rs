//! In-memory tone capture
//!
//! Records every tone started and stopped. Handy for headless runs and for
//! asserting on what a controller would have played.

use super::{ActiveTone, ToneOutput, ToneSpec};
use crate::error::Result;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct CaptureLog {
    started: Vec<ToneSpec>,
    stopped: usize,
}

/// Tone output recording into memory
#[derive(Debug, Clone, Default)]
pub struct CaptureToneOutput {
    log: Arc<Mutex<CaptureLog>>,
}

impl CaptureToneOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tone started so far, oldest first
    pub fn started(&self) -> Vec<ToneSpec> {
        self.log.lock().map(|log| log.started.clone()).unwrap_or_default()
    }

    /// Number of tones started so far
    pub fn start_count(&self) -> usize {
        self.log.lock().map(|log| log.started.len()).unwrap_or(0)
    }

    /// Number of handles explicitly stopped
    pub fn stop_count(&self) -> usize {
        self.log.lock().map(|log| log.stopped).unwrap_or(0)
    }

    /// Handles started but not yet stopped
    pub fn unstopped_count(&self) -> usize {
        self.log
            .lock()
            .map(|log| log.started.len() - log.stopped)
            .unwrap_or(0)
    }

    /// Most recent tone
    pub fn last(&self) -> Option<ToneSpec> {
        self.log.lock().ok().and_then(|log| log.started.last().copied())
    }
}

struct CapturedTone {
    log: Arc<Mutex<CaptureLog>>,
}

impl ActiveTone for CapturedTone {
    fn stop(self: Box<Self>) {
        if let Ok(mut log) = self.log.lock() {
            log.stopped += 1;
        }
    }
}

impl ToneOutput for CaptureToneOutput {
    fn start(&self, tone: ToneSpec) -> Result<Box<dyn ActiveTone>> {
        if let Ok(mut log) = self.log.lock() {
            log.started.push(tone);
        }
        Ok(Box::new(CapturedTone {
            log: Arc::clone(&self.log),
        }))
    }
}
