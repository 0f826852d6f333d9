//! Error types for chartspeak-ui

use crate::client::AnalysisError;
use thiserror::Error;

/// Upload and insights flow errors
#[derive(Error, Debug)]
pub enum FlowError {
    /// Selected file is not an image
    #[error("Invalid file type. Please select an image file.")]
    InvalidFileType,

    /// Analyze requested with nothing selected
    #[error("No file selected")]
    NoFileSelected,

    /// Reading the selected file failed
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The analysis adapter call failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Convenience Result type using chartspeak-ui FlowError
pub type Result<T> = std::result::Result<T, FlowError>;
