//! Tone output that only logs
//!
//! Used when no audio device is compiled in or requested; tones still reach
//! listeners through `ToneStarted` events.

use super::{ActiveTone, ToneOutput, ToneSpec};
use crate::error::Result;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct TracingToneOutput;

impl TracingToneOutput {
    pub fn new() -> Self {
        Self
    }
}

struct LoggedTone {
    frequency_hz: f64,
}

impl ActiveTone for LoggedTone {
    fn stop(self: Box<Self>) {
        debug!(frequency_hz = self.frequency_hz, "Tone stopped");
    }
}

impl ToneOutput for TracingToneOutput {
    fn start(&self, tone: ToneSpec) -> Result<Box<dyn ActiveTone>> {
        info!(
            frequency_hz = tone.frequency_hz,
            gain = tone.gain,
            duration_ms = tone.duration.as_millis() as u64,
            "Tone"
        );
        Ok(Box::new(LoggedTone {
            frequency_hz: tone.frequency_hz,
        }))
    }
}
