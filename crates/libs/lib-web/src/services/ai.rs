//! # AI Completion Service
//!
//! Forwards a client-held conversation to an OpenAI-compatible
//! `chat/completions` endpoint, prefixed with the selected persona's system
//! prompt. Nothing is stored server-side.

use lib_core::dto::ChatTurn;
use lib_core::{AiConfig, AppError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const STYLE_RULE: &str =
    "Only give clean, simple, short organized text. Do not use markdown tables, pipes, code blocks, or complex formatting.";

/// Chatbot personality selected by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    #[default]
    Friendly,
    Sarcastic,
    Coder,
    Romantic,
}

impl Persona {
    /// Unknown or missing keys fall back to [`Persona::Friendly`].
    pub fn from_key(key: Option<&str>) -> Self {
        match key.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            Some("sarcastic") => Persona::Sarcastic,
            Some("coder") => Persona::Coder,
            Some("romantic") => Persona::Romantic,
            _ => Persona::Friendly,
        }
    }

    pub fn system_prompt(self) -> String {
        let voice = match self {
            Persona::Friendly => "You are a friendly, helpful AI who talks politely.",
            Persona::Sarcastic => "You are a sarcastic AI with witty replies.",
            Persona::Coder => "You are a senior software engineer. Answer like a pro coder.",
            Persona::Romantic => "You are a sweet, loving AI that talks romantically.",
        };
        format!("{} {}", voice, STYLE_RULE)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatTurn,
}

/// HTTP client wrapper for the completion provider.
pub struct AiService {
    http: Client,
    config: AiConfig,
}

impl AiService {
    /// Create a new client with the configured request timeout.
    pub fn new(config: AiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { http, config })
    }

    /// Ask the provider for the next assistant turn.
    ///
    /// Returns the full prompt sent upstream (system turn first) and the reply.
    pub async fn complete(&self, persona: Persona, turns: &[ChatTurn]) -> Result<(Vec<ChatTurn>, ChatTurn)> {
        if turns.is_empty() {
            return Err(AppError::InvalidInput("Messages array is required.".to_string()));
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("AI_API_KEY is not configured".to_string()))?;

        let mut prompt = Vec::with_capacity(turns.len() + 1);
        prompt.push(ChatTurn::new("system", persona.system_prompt()));
        prompt.extend_from_slice(turns);

        debug!(persona = ?persona, turns = turns.len(), "[AI] requesting completion");

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.config.model,
                messages: &prompt,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timeout = e.is_timeout(), "[AI] request failed");
                AppError::Upstream(format!("AI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "[AI] provider returned an error status");
            return Err(AppError::Upstream(format!("AI provider returned {}", status)));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid AI response: {}", e)))?;

        let reply = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AppError::Upstream("AI returned no choices".to_string()))?;

        info!(persona = ?persona, reply_len = reply.content.len(), "[AI] completion received");

        Ok((prompt, reply))
    }
}
