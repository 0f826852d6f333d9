//! Screen navigation
//!
//! The upload screen hands its result to the insights screen as a typed
//! [`Handoff`]. Entering insights without a prior analysis sends the user
//! back to upload.

use crate::client::ChartAnalysisService;
use crate::image::ChartImage;
use crate::insights::InsightsSession;
use chartspeak_common::events::EventBus;
use std::sync::Arc;
use tracing::warn;

/// Output of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub insights: String,
    pub image: ChartImage,
}

/// What the upload screen passes on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    NoPriorAnalysis,
    Analysis(AnalysisResult),
}

impl From<AnalysisResult> for Handoff {
    fn from(result: AnalysisResult) -> Self {
        Handoff::Analysis(result)
    }
}

/// Where the user ends up
pub enum Screen {
    Upload,
    Insights(InsightsSession),
}

/// Open the insights screen, or redirect to upload without an analysis
pub fn enter_insights(
    handoff: Handoff,
    service: Arc<dyn ChartAnalysisService>,
    events: EventBus,
) -> Screen {
    match handoff {
        Handoff::Analysis(result) => {
            Screen::Insights(InsightsSession::from_analysis(result, service, events))
        }
        Handoff::NoPriorAnalysis => {
            warn!("Insights opened without an analysis");
            events.announce("No chart data found. Redirecting to upload page.");
            Screen::Upload
        }
    }
}
