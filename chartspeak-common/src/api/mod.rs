//! API module for shared HTTP API types
//!
//! The analysis adapter (chartspeak-ai) serves these types and the upload
//! flow (chartspeak-ui) consumes them, so both sides agree on one wire format.

pub mod types;

pub use types::{
    AnalysisResponse, AnalyzeReply, ErrorResponse, HealthResponse, ANALYZE_CHART_PATH,
    FIELD_HISTORY, FIELD_IMAGE, FIELD_QUESTION,
};
