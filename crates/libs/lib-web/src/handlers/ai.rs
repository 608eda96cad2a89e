//! # AI Chat Handler
//!
//! `POST /api/ai/chat` forwards a conversation to the completion provider with
//! the selected persona's system prompt.
//!
//! ```text
//! POST /api/ai/chat
//! Authorization: Bearer <jwt>
//!
//! { "messages": [{ "role": "user", "content": "hi" }], "persona": "coder" }
//! ```

use crate::services::{AiService, Persona};
use axum::{extract::State, Extension, Json};
use lib_auth::Claims;
use lib_core::dto::{AiChatRequest, AiChatResponse};
use lib_core::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// Returns `400` for an empty conversation and `502` when the provider fails,
/// times out, or is not configured.
#[instrument(skip_all, fields(user_id = %claims.sub))]
pub async fn ai_chat(
    State(ai): State<Arc<AiService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AiChatRequest>,
) -> Result<Json<AiChatResponse>> {
    let persona = Persona::from_key(req.persona.as_deref());
    info!(persona = ?persona, turns = req.messages.len(), "[AI] chat request");

    let (mut conversation, reply) = ai.complete(persona, &req.messages).await?;
    conversation.push(reply.clone());

    Ok(Json(AiChatResponse {
        assistant_message: reply,
        full_conversation: conversation,
    }))
}
