//! Insights session
//!
//! Holds the analyzed chart and the conversation about it. Follow-up
//! questions go back to the adapter with the image and the conversation so
//! far; failures become an apology in the conversation rather than an error.

use crate::client::{AnalysisRequest, ChartAnalysisService};
use crate::flow::AnalysisResult;
use crate::image::ChartImage;
use chartspeak_common::chat::ChatMessage;
use chartspeak_common::events::EventBus;
use std::sync::Arc;
use tracing::{error, info};

/// Assistant reply used when a follow-up fails
pub const APOLOGY: &str =
    "I apologize, but I'm having trouble generating a response right now. Please try again.";

pub struct InsightsSession {
    image: ChartImage,
    messages: Vec<ChatMessage>,
    service: Arc<dyn ChartAnalysisService>,
    events: EventBus,
}

impl InsightsSession {
    /// Seed the conversation with the analysis
    pub fn from_analysis(
        result: AnalysisResult,
        service: Arc<dyn ChartAnalysisService>,
        events: EventBus,
    ) -> Self {
        events.announce("Chart insights loaded successfully");
        Self {
            image: result.image,
            messages: vec![ChatMessage::assistant(result.insights)],
            service,
            events,
        }
    }

    pub fn image(&self) -> &ChartImage {
        &self.image
    }

    /// Conversation so far, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Ask a follow-up question
    ///
    /// Blank input is ignored (`None`). Otherwise returns the assistant
    /// message appended in reply, which is the apology if the call failed.
    pub async fn ask(&mut self, question: &str) -> Option<&ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        // History sent upstream is the conversation before this question
        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(question));
        self.events
            .announce("Question submitted. Generating response...");

        let request = AnalysisRequest::follow_up(self.image.clone(), question, history);
        match self.service.analyze(request).await {
            Ok(answer) => {
                info!(answer_len = answer.len(), "Follow-up answered");
                self.messages.push(ChatMessage::assistant(answer));
                self.events
                    .announce("Response received. New insight available.");
            }
            Err(e) => {
                error!("Error getting response: {}", e);
                self.messages.push(ChatMessage::assistant(APOLOGY));
                self.events
                    .announce("Error generating response. Please try again.");
            }
        }

        self.messages.last()
    }
}
