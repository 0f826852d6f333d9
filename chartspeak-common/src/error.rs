//! Common error types for ChartSpeak

use thiserror::Error;

/// Common result type for ChartSpeak operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across ChartSpeak services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
