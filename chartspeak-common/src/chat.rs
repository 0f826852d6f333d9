//! Chat message types
//!
//! Conversation turns exchanged between the Insights screen and the
//! analysis adapter. The JSON form (`{"role":"user","content":"..."}`) is the
//! wire format of the `history` multipart field.

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker name used when a conversation is rendered into a prompt
    pub fn speaker(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Encode a conversation as the JSON array carried by the `history` field
pub fn encode_history(messages: &[ChatMessage]) -> crate::Result<String> {
    Ok(serde_json::to_string(messages)?)
}

/// Decode the JSON array carried by the `history` field
pub fn decode_history(json: &str) -> crate::Result<Vec<ChatMessage>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format_is_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_decode_history_from_browser_payload() {
        let json = r#"[{"role":"assistant","content":"A bar chart."},{"role":"user","content":"Peak?"}]"#;
        let history = decode_history(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::Assistant);
        assert_eq!(history[1].content, "Peak?");
    }

    #[test]
    fn test_decode_history_rejects_unknown_role() {
        let json = r#"[{"role":"system","content":"x"}]"#;
        assert!(decode_history(json).is_err());
    }

    #[test]
    fn test_speaker_names() {
        assert_eq!(Role::User.speaker(), "User");
        assert_eq!(Role::Assistant.speaker(), "Assistant");
    }
}
