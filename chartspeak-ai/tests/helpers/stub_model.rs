//! Scripted stand-in for the hosted model

use async_trait::async_trait;
use chartspeak_ai::services::{ChartModel, ModelError, ModelRequest};
use std::sync::Mutex;

/// Model that echoes its prompt, or fails when told to
pub struct StubModel {
    failure: Option<String>,
    calls: Mutex<Vec<(String, ModelRequest)>>,
}

impl StubModel {
    /// Answers every request with the prompt it received
    pub fn echo() -> Self {
        Self {
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request with a network error
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (api_key, request) pairs received so far
    pub fn calls(&self) -> Vec<(String, ModelRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartModel for StubModel {
    async fn generate(&self, api_key: &str, request: &ModelRequest) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));
        match &self.failure {
            Some(message) => Err(ModelError::NetworkError(message.clone())),
            None => Ok(request.prompt.clone()),
        }
    }
}
