//! Chart analysis endpoint
//!
//! `POST /api/analyze-chart` accepts a multipart form with an `image` file,
//! an optional `question` and an optional JSON `history`, builds the prompt
//! and forwards image + prompt to the hosted model in a single call.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use chartspeak_common::api::{
    AnalysisResponse, ANALYZE_CHART_PATH, FIELD_HISTORY, FIELD_IMAGE, FIELD_QUESTION,
};
use chartspeak_common::chat::decode_history;
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::services::{build_prompt, ModelRequest};
use crate::AppState;

/// Largest accepted request body
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Uploaded chart image
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decoded multipart form
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub image: Option<UploadedImage>,
    pub question: Option<String>,
    pub history: Option<String>,
}

impl AnalyzeForm {
    /// Read all fields; unknown fields are skipped
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::AnalysisFailed(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_IMAGE => {
                    let file_name = field.file_name().map(str::to_string);
                    let declared = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::AnalysisFailed(e.body_text()))?;
                    if bytes.is_empty() {
                        continue;
                    }
                    form.image = Some(UploadedImage {
                        file_name,
                        mime_type: resolve_mime_type(declared.as_deref(), &bytes),
                        bytes: bytes.to_vec(),
                    });
                }
                FIELD_QUESTION => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::AnalysisFailed(e.body_text()))?;
                    form.question = Some(text).filter(|q| !q.trim().is_empty());
                }
                FIELD_HISTORY => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::AnalysisFailed(e.body_text()))?;
                    form.history = Some(text).filter(|h| !h.trim().is_empty());
                }
                other => {
                    warn!(field = other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }
}

/// Pick the MIME type sent upstream
///
/// A declared `image/*` type wins; otherwise the content is sniffed, so blobs
/// re-uploaded without a type still reach the model with a usable one.
pub fn resolve_mime_type(declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared.filter(|t| t.starts_with("image/")) {
        return declared.to_string();
    }

    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
            kind.mime_type().to_string()
        }
        _ => declared
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

/// POST /api/analyze-chart
pub async fn analyze_chart(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalysisResponse>> {
    let multipart = multipart.map_err(|rejection| {
        warn!("Rejected non-multipart analysis request: {}", rejection.body_text());
        ApiError::NoImage
    })?;

    let form = match AnalyzeForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("Failed to read analysis request: {}", e);
            state.record_error(e.to_string()).await;
            return Err(e);
        }
    };

    info!(
        has_file = form.image.is_some(),
        file_type = form.image.as_ref().map(|i| i.mime_type.as_str()),
        has_question = form.question.is_some(),
        has_history = form.history.is_some(),
        "Analysis request received"
    );

    let Some(image) = form.image else {
        error!("No image file provided in request");
        return Err(ApiError::NoImage);
    };

    let Some(api_key) = state.api_key.as_deref() else {
        error!("Model API key not configured");
        return Err(ApiError::MissingApiKey);
    };

    let history = match form.history.as_deref().map(decode_history).transpose() {
        Ok(history) => history,
        Err(e) => {
            error!("Invalid conversation history: {}", e);
            let err = ApiError::AnalysisFailed(e.to_string());
            state.record_error(err.to_string()).await;
            return Err(err);
        }
    };

    let prompt = build_prompt(form.question.as_deref(), history.as_deref());
    info!(
        prompt_kind = ?prompt.kind,
        image_bytes = image.bytes.len(),
        file_name = image.file_name.as_deref().unwrap_or("<unnamed>"),
        "Sending request to model"
    );

    let request = ModelRequest {
        prompt: prompt.text,
        mime_type: image.mime_type,
        image: image.bytes,
    };

    match state.model.generate(api_key, &request).await {
        Ok(insights) => {
            info!(insights_len = insights.len(), "Analysis complete");
            Ok(Json(AnalysisResponse::new(insights)))
        }
        Err(e) => {
            error!("Error analyzing chart: {}", e);
            let err = ApiError::AnalysisFailed(e.to_string());
            state.record_error(err.to_string()).await;
            Err(err)
        }
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route(ANALYZE_CHART_PATH, post(analyze_chart))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
