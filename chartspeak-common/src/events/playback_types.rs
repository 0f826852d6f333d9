//! Playback-related type definitions
//!
//! Supporting types for the chart playback and speech state machines.

use serde::{Deserialize, Serialize};

/// Chart autoplay state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Stopped => write!(f, "stopped"),
            PlaybackStatus::Playing => write!(f, "playing"),
        }
    }
}

/// Text-to-speech state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechStatus {
    /// No utterance active
    #[default]
    Idle,
    /// Engine is reading an utterance
    Speaking,
    /// Utterance held mid-way, resumable
    Paused,
}

impl std::fmt::Display for SpeechStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechStatus::Idle => write!(f, "idle"),
            SpeechStatus::Speaking => write!(f, "speaking"),
            SpeechStatus::Paused => write!(f, "paused"),
        }
    }
}
