//! Services for chartspeak-ai

pub mod gemini_client;
pub mod prompt;

pub use gemini_client::{ChartModel, GeminiClient, ModelError, ModelRequest};
pub use prompt::{build_prompt, Prompt, PromptKind};
