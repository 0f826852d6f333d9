//! # ChartSpeak Audio Player Library (chartspeak-ap)
//!
//! Sonifies a chart and reads insights aloud.
//!
//! **Purpose:** Map data point values onto tones, walk the chart manually or
//! on an autoplay timer, drive text-to-speech of analysis results, and
//! provide an HTTP/SSE control interface.

pub mod api;
pub mod audio;
pub mod error;
pub mod playback;
pub mod speech;
pub mod tone;

pub use error::{Error, Result};
pub use playback::PlaybackController;
pub use speech::SpeechController;
