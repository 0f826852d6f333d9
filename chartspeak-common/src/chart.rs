//! Chart data model
//!
//! The sonified chart operates on a fixed demonstration series: one data
//! point per month, values expressed as percentages. Ordering is significant,
//! since "next"/"previous" navigation walks the series by position.

use serde::{Deserialize, Serialize};

/// Upper bound of a data point value (percent)
pub const MAX_VALUE: u8 = 100;

/// A single chart data point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Position in the series (0-based)
    pub index: usize,
    /// Value in percent, 0..=100
    pub value: u8,
    /// Human-readable label ("January", ...)
    pub label: String,
}

impl DataPoint {
    pub fn new(index: usize, value: u8, label: impl Into<String>) -> Self {
        Self {
            index,
            value: value.min(MAX_VALUE),
            label: label.into(),
        }
    }
}

const DEMO_SERIES: [(&str, u8); 12] = [
    ("January", 25),
    ("February", 42),
    ("March", 38),
    ("April", 55),
    ("May", 67),
    ("June", 78),
    ("July", 72),
    ("August", 85),
    ("September", 91),
    ("October", 88),
    ("November", 95),
    ("December", 100),
];

/// Monthly performance demonstration data (12 points, January..December)
pub fn demo_series() -> Vec<DataPoint> {
    DEMO_SERIES
        .iter()
        .enumerate()
        .map(|(index, (label, value))| DataPoint::new(index, *value, *label))
        .collect()
}
