//! # ChartSpeak Common Library
//!
//! Shared code for the ChartSpeak services:
//! - Chart data model (demonstration data set)
//! - Chat message types shared by the analysis adapter and its clients
//! - Event types and the in-process EventBus
//! - API wire types for `POST /api/analyze-chart`
//! - Configuration loading and logging setup

pub mod api;
pub mod chart;
pub mod chat;
pub mod config;
pub mod error;
pub mod events;

pub use chart::DataPoint;
pub use chat::{ChatMessage, Role};
pub use error::{Error, Result};
