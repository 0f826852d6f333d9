//! # ChartSpeak UI Library (chartspeak-ui)
//!
//! Client side of ChartSpeak: select a chart image, send it for analysis,
//! then explore the insights by asking follow-up questions and listening to
//! them.

pub mod client;
pub mod error;
pub mod flow;
pub mod image;
pub mod insights;
pub mod upload;

pub use client::{AnalysisClient, AnalysisError, AnalysisRequest, ChartAnalysisService};
pub use error::{FlowError, Result};
pub use flow::{enter_insights, AnalysisResult, Handoff, Screen};
pub use image::ChartImage;
pub use insights::InsightsSession;
pub use upload::{UploadFlow, UploadState};
