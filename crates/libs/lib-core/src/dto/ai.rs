//! # AI Proxy Data Transfer Objects
//!
//! Shapes for `POST /api/ai/chat`. The conversation is owned by the client and
//! sent whole on every request; nothing here is persisted.

use serde::{Deserialize, Serialize};

/// One turn of a chatbot conversation, in the completion provider's format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// `user`, `assistant`, or `system`.
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Request body for the AI proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    /// Persona key; unknown or absent selects `friendly`.
    #[serde(default)]
    pub persona: Option<String>,
}

/// Response body for the AI proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatResponse {
    pub assistant_message: ChatTurn,
    /// System prompt, the request's turns, then the assistant reply.
    pub full_conversation: Vec<ChatTurn>,
}
