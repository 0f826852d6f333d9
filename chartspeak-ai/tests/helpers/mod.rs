//! Test Helper Utilities
//!
//! Shared utilities for testing chartspeak-ai: a scripted model, a multipart
//! body builder and a request runner for the router.

#![allow(dead_code)]

pub mod multipart;
pub mod stub_model;

pub use multipart::{multipart_request, FormPart, PNG_BYTES};
pub use stub_model::StubModel;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Run one request and decode the JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
