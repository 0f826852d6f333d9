//! Tone output
//!
//! A [`ToneOutput`] turns a [`ToneSpec`] into sound and hands back an owned
//! [`ActiveTone`] handle. The playback controller keeps at most one handle
//! and stops it before starting the next tone.

pub mod capture;
pub mod log_output;
#[cfg(feature = "cpal-output")]
pub mod output;

pub use capture::CaptureToneOutput;
pub use log_output::TracingToneOutput;
#[cfg(feature = "cpal-output")]
pub use output::CpalToneOutput;

use crate::error::Result;
use std::time::Duration;

/// One sine tone to sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    /// Frequency in Hz
    pub frequency_hz: f64,
    /// Linear gain, 0.0 (silent) to 1.0
    pub gain: f32,
    /// How long the tone sounds unless stopped earlier
    pub duration: Duration,
}

/// Handle to a sounding tone
pub trait ActiveTone: Send {
    /// Stop the tone now. Stopping a tone that already ended is a no-op.
    fn stop(self: Box<Self>);
}

/// Tone sink
pub trait ToneOutput: Send + Sync {
    /// Start sounding `tone`
    fn start(&self, tone: ToneSpec) -> Result<Box<dyn ActiveTone>>;
}
