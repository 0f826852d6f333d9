//! Analysis endpoint integration tests
//!
//! Drives `POST /api/analyze-chart` through the router with a scripted model
//! that echoes its prompt, so tests can observe which template was chosen.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chartspeak_ai::{build_router, AppState};
use helpers::{multipart_request, send, FormPart, StubModel, PNG_BYTES};
use std::sync::Arc;

fn app_with(model: Arc<StubModel>, api_key: Option<&str>) -> (axum::Router, AppState) {
    let state = AppState::new(model, api_key.map(str::to_string));
    (build_router(state.clone()), state)
}

#[tokio::test]
async fn test_missing_image_is_rejected_before_model_call() {
    // Given: a configured adapter
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));

    // When: the form carries only a question
    let request = multipart_request(&[FormPart::text("question", "What is this?")]);
    let (status, body) = send(app, request).await;

    // Then: 400 with the exact error body, and no upstream call
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "No image file provided" }));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_empty_image_field_counts_as_missing() {
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));

    let request = multipart_request(&[FormPart::File {
        name: "image",
        file_name: "empty.png",
        content_type: Some("image/png"),
        bytes: &[],
    }]);
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze-chart")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn test_missing_credential_is_a_configuration_error() {
    // Given: no API key configured
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), None);

    // When: a valid image is posted
    let (status, body) = send(app, multipart_request(&[FormPart::png_image()])).await;

    // Then: 500 with the configuration message, and no upstream call
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Gemini API key not configured"), "got: {error}");
    assert!(body.get("details").is_none());
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_initial_analysis_uses_initial_template() {
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));

    let (status, body) = send(app, multipart_request(&[FormPart::png_image()])).await;

    assert_eq!(status, StatusCode::OK);
    let insights = body["insights"].as_str().unwrap();
    assert!(insights.contains("**Chart Type**"));
    assert!(!insights.contains("Previous conversation"));

    // The image and credential reach the model unchanged
    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "test-key");
    assert_eq!(calls[0].1.mime_type, "image/png");
    assert_eq!(calls[0].1.image, PNG_BYTES);
}

#[tokio::test]
async fn test_follow_up_prompt_references_prior_turns() {
    // Given: a conversation with one exchange
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));
    let history = serde_json::json!([
        { "role": "assistant", "content": "A bar chart of monthly performance." },
        { "role": "user", "content": "Which month peaks?" },
        { "role": "assistant", "content": "December reaches 100 percent." }
    ])
    .to_string();

    // When: a follow-up question is posted with the history
    let request = multipart_request(&[
        FormPart::png_image(),
        FormPart::text("question", "How does March compare?"),
        FormPart::text("history", &history),
    ]);
    let (status, body) = send(app, request).await;

    // Then: the follow-up template was selected and replays the turns
    assert_eq!(status, StatusCode::OK);
    let insights = body["insights"].as_str().unwrap();
    assert!(insights.contains("Previous conversation:"));
    assert!(insights.contains("Assistant: A bar chart of monthly performance."));
    assert!(insights.contains("User: Which month peaks?"));
    assert!(insights.contains("Assistant: December reaches 100 percent."));
    assert!(insights.contains("User's new question: How does March compare?"));
    assert!(!insights.contains("**Chart Type**"));
}

#[tokio::test]
async fn test_untyped_blob_is_sniffed() {
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));

    let request = multipart_request(&[FormPart::File {
        name: "image",
        file_name: "blob",
        content_type: None,
        bytes: PNG_BYTES,
    }]);
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(model.calls()[0].1.mime_type, "image/png");
}

#[tokio::test]
async fn test_invalid_history_is_a_request_failure() {
    let model = Arc::new(StubModel::echo());
    let (app, _) = app_with(model.clone(), Some("test-key"));

    let request = multipart_request(&[
        FormPart::png_image(),
        FormPart::text("question", "Why?"),
        FormPart::text("history", "not json"),
    ]);
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to analyze chart");
    assert!(body["details"].is_string());
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_reported_with_details() {
    // Given: a model that always fails
    let model = Arc::new(StubModel::failing("connection reset"));
    let (app, state) = app_with(model.clone(), Some("test-key"));

    // When: an analysis is requested
    let (status, body) = send(app, multipart_request(&[FormPart::png_image()])).await;

    // Then: one attempt, no retry, and the failure is surfaced
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to analyze chart");
    assert!(body["details"].as_str().unwrap().contains("connection reset"));
    assert_eq!(model.calls().len(), 1);

    // And: health diagnostics remember it
    let last_error = state.last_error.read().await.clone();
    assert!(last_error.unwrap().contains("connection reset"));
}
