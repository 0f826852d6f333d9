//! Error types for chartspeak-ap
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for chartspeak-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Speech engine errors
    #[error("Speech error: {0}")]
    Speech(String),

    /// Invalid request or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using chartspeak-ap Error
pub type Result<T> = std::result::Result<T, Error>;
