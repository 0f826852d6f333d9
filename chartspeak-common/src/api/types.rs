//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Route of the chart analysis endpoint
pub const ANALYZE_CHART_PATH: &str = "/api/analyze-chart";

/// Multipart field carrying the chart image (required)
pub const FIELD_IMAGE: &str = "image";

/// Multipart field carrying a follow-up question (optional)
pub const FIELD_QUESTION: &str = "question";

/// Multipart field carrying the JSON-encoded prior conversation (optional)
pub const FIELD_HISTORY: &str = "history";

/// Successful analysis
///
/// `insights` is optional on the decode side so that clients can report a
/// 2xx body without insights as a failure instead of a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
}

impl AnalysisResponse {
    pub fn new(insights: impl Into<String>) -> Self {
        Self {
            insights: Some(insights.into()),
        }
    }
}

/// Error body returned with 4xx/5xx statuses
///
/// # Examples
///
/// ```
/// use chartspeak_common::api::ErrorResponse;
///
/// let body = ErrorResponse::new("No image file provided");
/// assert_eq!(
///     serde_json::to_string(&body).unwrap(),
///     r#"{"error":"No image file provided"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Either body of `POST /api/analyze-chart`, decoded without knowing the status
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeReply {
    Error(ErrorResponse),
    Success(AnalysisResponse),
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Last error message if any (for diagnostics)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
