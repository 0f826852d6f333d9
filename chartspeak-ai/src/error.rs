//! Error types for chartspeak-ai
//!
//! Every failure of `POST /api/analyze-chart` is reported as a JSON body of
//! the shape `{"error": ..., "details"?: ...}`. Failures are classified only
//! as validation (400), configuration (500) or request failure (500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chartspeak_common::api::ErrorResponse;
use chartspeak_common::config::API_KEY_ENV;
use thiserror::Error;

/// Message returned when the request carries no image
pub const NO_IMAGE_MESSAGE: &str = "No image file provided";

/// Message returned for any upstream or request processing failure
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze chart";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No `image` field, or an empty one (400)
    #[error("No image file provided")]
    NoImage,

    /// Model credential missing (500)
    #[error("Gemini API key not configured")]
    MissingApiKey,

    /// Upstream call or request decoding failed (500)
    #[error("Failed to analyze chart: {0}")]
    AnalysisFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoImage => StatusCode::BAD_REQUEST,
            ApiError::MissingApiKey | ApiError::AnalysisFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wire body for this error
    pub fn body(&self) -> ErrorResponse {
        match self {
            ApiError::NoImage => ErrorResponse::new(NO_IMAGE_MESSAGE),
            ApiError::MissingApiKey => ErrorResponse::new(format!(
                "Gemini API key not configured. Please set the {API_KEY_ENV} environment variable \
                 or add api_key to the [ai] table of your config.toml."
            )),
            ApiError::AnalysisFailed(details) => {
                ErrorResponse::with_details(ANALYSIS_FAILED_MESSAGE, details.clone())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NoImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingApiKey.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::AnalysisFailed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_key_message_is_actionable() {
        let body = ApiError::MissingApiKey.body();
        assert!(body.error.starts_with("Gemini API key not configured"));
        assert!(body.error.contains("GEMINI_API_KEY"));
        assert!(body.details.is_none());
    }

    #[test]
    fn test_analysis_failure_carries_details() {
        let body = ApiError::AnalysisFailed("upstream 503".into()).body();
        assert_eq!(body.error, "Failed to analyze chart");
        assert_eq!(body.details.as_deref(), Some("upstream 503"));
    }
}
