//! Prompt construction
//!
//! Two templates exist: the initial multi-section chart description and the
//! follow-up template that replays the prior conversation. The follow-up
//! template is chosen only when both a question and a history are present.

use chartspeak_common::ChatMessage;

const PERSONA: &str =
    "You are an expert data analyst helping visually impaired users understand charts and graphs.";

const INITIAL_INSTRUCTIONS: &str = "\
Analyze this chart image and provide a comprehensive, accessible description that includes:

1. **Chart Type**: Identify what type of chart/graph this is (bar chart, line chart, pie chart, etc.)

2. **Overall Trend**: Describe the main pattern or trend shown in the data

3. **Key Data Points**: List the most important values, ranges, or measurements

4. **Notable Observations**: Point out any peaks, valleys, anomalies, or interesting patterns

5. **Context & Insights**: Provide meaningful insights about what this data suggests or implies

6. **Recommendations**: If applicable, suggest what actions or further analysis might be valuable

Format your response in clear markdown with headers and bullet points for easy reading and \
text-to-speech compatibility. Be thorough but concise. Focus on making the data accessible and \
understandable.";

const FOLLOW_UP_INSTRUCTIONS: &str = "\
Based on the chart image and the conversation history, provide a clear, concise answer to the \
user's question. Format your response in markdown for easy reading and text-to-speech \
compatibility. Be helpful and specific.";

/// Which template a prompt was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Initial,
    FollowUp,
}

/// A rendered prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Build the prompt for a request
///
/// Blank questions count as absent. An empty history still selects the
/// follow-up template when a question is present, matching a client that
/// sent `history=[]`.
pub fn build_prompt(question: Option<&str>, history: Option<&[ChatMessage]>) -> Prompt {
    match (question.map(str::trim).filter(|q| !q.is_empty()), history) {
        (Some(question), Some(history)) => Prompt {
            kind: PromptKind::FollowUp,
            text: follow_up_prompt(question, history),
        },
        _ => Prompt {
            kind: PromptKind::Initial,
            text: initial_prompt(),
        },
    }
}

/// Initial chart description prompt
pub fn initial_prompt() -> String {
    format!("{PERSONA}\n\n{INITIAL_INSTRUCTIONS}")
}

/// Follow-up prompt replaying the conversation so far
pub fn follow_up_prompt(question: &str, history: &[ChatMessage]) -> String {
    format!(
        "{PERSONA}\n\nPrevious conversation:\n{}\n\nUser's new question: {question}\n\n{FOLLOW_UP_INSTRUCTIONS}",
        render_conversation(history)
    )
}

/// Render turns as `User: ...` / `Assistant: ...` separated by blank lines
pub fn render_conversation(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|msg| format!("{}: {}", msg.role.speaker(), msg.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
