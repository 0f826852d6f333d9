//! Analysis adapter client
//!
//! Posts the chart (plus an optional follow-up question and the prior
//! conversation) to `POST /api/analyze-chart` as a multipart form.

use crate::image::ChartImage;
use async_trait::async_trait;
use chartspeak_common::api::{
    AnalyzeReply, ANALYZE_CHART_PATH, FIELD_HISTORY, FIELD_IMAGE, FIELD_QUESTION,
};
use chartspeak_common::chat::{encode_history, ChatMessage};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("ChartSpeak/", env!("CARGO_PKG_VERSION"));

/// Fallback when an error body names no reason
const DEFAULT_FAILURE: &str = "Failed to analyze chart";

/// Analysis client errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-2xx answer; the message comes from the body's `error`/`details`
    #[error("{message}")]
    ServerError { status: u16, message: String },

    #[error("No insights returned from API")]
    MissingInsights,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// One call to the analysis adapter
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: ChartImage,
    pub question: Option<String>,
    pub history: Option<Vec<ChatMessage>>,
}

impl AnalysisRequest {
    /// First analysis of a chart
    pub fn initial(image: ChartImage) -> Self {
        Self {
            image,
            question: None,
            history: None,
        }
    }

    /// Follow-up question with the conversation so far
    pub fn follow_up(image: ChartImage, question: impl Into<String>, history: Vec<ChatMessage>) -> Self {
        Self {
            image,
            question: Some(question.into()),
            history: Some(history),
        }
    }
}

/// Anything that can turn a chart into insights
#[async_trait]
pub trait ChartAnalysisService: Send + Sync {
    /// Returns the insights text
    async fn analyze(&self, request: AnalysisRequest) -> Result<String, AnalysisError>;
}

/// HTTP client for chartspeak-ai
pub struct AnalysisClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl AnalysisClient {
    /// `server_url` is the adapter's base URL, e.g. `http://127.0.0.1:5780`
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), ANALYZE_CHART_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: AnalysisRequest) -> Result<Form, AnalysisError> {
        let image = Part::bytes(request.image.bytes)
            .file_name(request.image.file_name)
            .mime_str(&request.image.mime_type)
            .map_err(|e| AnalysisError::InvalidRequest(e.to_string()))?;

        let mut form = Form::new().part(FIELD_IMAGE, image);
        if let Some(question) = request.question {
            form = form.text(FIELD_QUESTION, question);
        }
        if let Some(history) = request.history {
            let encoded = encode_history(&history)
                .map_err(|e| AnalysisError::InvalidRequest(e.to_string()))?;
            form = form.text(FIELD_HISTORY, encoded);
        }
        Ok(form)
    }
}

#[async_trait]
impl ChartAnalysisService for AnalysisClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<String, AnalysisError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            image_bytes = request.image.bytes.len(),
            has_question = request.question.is_some(),
            "Posting chart for analysis"
        );

        let form = Self::build_form(request)?;
        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AnalysisError::NetworkError(e.to_string()))?;
        let reply: Option<AnalyzeReply> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = match reply {
                Some(AnalyzeReply::Error(body)) if !body.error.is_empty() => body.error,
                Some(AnalyzeReply::Error(body)) => {
                    body.details.unwrap_or_else(|| DEFAULT_FAILURE.to_string())
                }
                _ => DEFAULT_FAILURE.to_string(),
            };
            tracing::error!(status = status.as_u16(), body = %text, "API Error");
            return Err(AnalysisError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        match reply {
            Some(AnalyzeReply::Success(body)) => body
                .insights
                .filter(|insights| !insights.is_empty())
                .ok_or(AnalysisError::MissingInsights),
            Some(AnalyzeReply::Error(_)) => Err(AnalysisError::MissingInsights),
            None => Err(AnalysisError::ParseError(format!(
                "Unexpected response body: {text}"
            ))),
        }
    }
}
