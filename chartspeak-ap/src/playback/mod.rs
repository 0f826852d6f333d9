//! Chart playback
//!
//! [`PlaybackController`] owns the current data point, the autoplay timer
//! and the single active tone.

mod controller;
mod types;

pub use controller::{PlaybackController, AUTOPLAY_INTERVAL, DEFAULT_VOLUME};
pub use types::{Direction, Key, PlaybackState};
