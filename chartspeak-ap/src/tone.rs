//! Tone mapping
//!
//! Maps a data point value (percent) onto an audible frequency. The mapping
//! is linear: 0% sounds at 200 Hz and 100% at 800 Hz, so louder-looking bars
//! sound higher.

use chartspeak_common::chart::{DataPoint, MAX_VALUE};
use std::time::Duration;

/// Frequency of a 0% data point
pub const MIN_FREQUENCY_HZ: f64 = 200.0;

/// Frequency of a 100% data point
pub const MAX_FREQUENCY_HZ: f64 = 800.0;

/// How long a single tone sounds
pub const TONE_DURATION: Duration = Duration::from_millis(300);

/// Map a percentage onto the tone frequency
///
/// Input is clamped to `0..=100`; NaN is treated as 0.
pub fn frequency(value: f64) -> f64 {
    let value = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, f64::from(MAX_VALUE))
    };
    MIN_FREQUENCY_HZ + value * (MAX_FREQUENCY_HZ - MIN_FREQUENCY_HZ) / f64::from(MAX_VALUE)
}

/// Frequency for a data point
pub fn frequency_for(point: &DataPoint) -> f64 {
    frequency(f64::from(point.value))
}

/// Announcement made when a data point becomes current
pub fn describe(point: &DataPoint) -> String {
    format!(
        "{}: {} percent. Frequency: {} hertz.",
        point.label,
        point.value,
        frequency_for(point).round()
    )
}
