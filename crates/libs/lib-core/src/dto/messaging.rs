//! # Messaging Data Transfer Objects
//!
//! Wire schema for the live-connection transport and the REST fallback.
//!
//! Every live-connection frame is a JSON text frame of the form
//! `{"event": <name>, "data": {...}}`. Inbound frames decode into
//! [`ClientEvent`]; anything that does not match a variant (unknown event name,
//! missing required field, wrong type) is rejected at the gateway.
//!
//! ```text
//! client -> server   sendMessage, deleteMessage, markSeen, typing, stopTyping
//! server -> client   receiveMessage, messageDeleted, messageSeen,
//!                    messageDelivered, typing, stopTyping, intentFailed
//! ```

use crate::error::AppError;
use crate::model::store::models::Message;
use lib_utils::{format_time, validate_max_length, validate_not_empty, validate_phone};
use serde::{Deserialize, Serialize};

/// Maximum message text length, in bytes.
pub const MAX_MESSAGE_LENGTH: usize = 10000;

// region: --- Message Payload

/// A message as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: String,
    /// RFC3339 with millisecond precision.
    pub created_at: String,
    pub delivered: bool,
    pub seen: bool,
}

impl From<&Message> for MessagePayload {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id,
            sender_id: msg.sender_id,
            receiver_id: msg.receiver_id,
            text: msg.text.clone(),
            created_at: format_time(msg.created_at),
            delivered: msg.delivered,
            seen: msg.seen,
        }
    }
}

// endregion: --- Message Payload

// region: --- Client Events

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageData {
    pub receiver_phone: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageData {
    pub message_id: i64,
    /// Accepted for compatibility; the counterpart is derived from the stored message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkSeenData {
    pub other_user_id: i64,
    /// Accepted for compatibility; the authenticated identity is always used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypingData {
    pub receiver_id: i64,
}

/// Intents a client sends over its live connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    SendMessage(SendMessageData),
    DeleteMessage(DeleteMessageData),
    MarkSeen(MarkSeenData),
    Typing(TypingData),
    StopTyping(TypingData),
}

impl ClientEvent {
    /// Wire name of the intent, used in logs and `intentFailed` events.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::SendMessage(_) => "sendMessage",
            ClientEvent::DeleteMessage(_) => "deleteMessage",
            ClientEvent::MarkSeen(_) => "markSeen",
            ClientEvent::Typing(_) => "typing",
            ClientEvent::StopTyping(_) => "stopTyping",
        }
    }

    /// Field-level validation beyond what the schema enforces.
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            ClientEvent::SendMessage(data) => {
                validate_phone(&data.receiver_phone).map_err(AppError::InvalidInput)?;
                validate_not_empty(&data.text, "Message text").map_err(AppError::InvalidInput)?;
                validate_max_length(&data.text, MAX_MESSAGE_LENGTH, "Message text")
                    .map_err(AppError::InvalidInput)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

// endregion: --- Client Events

// region: --- Server Events

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageIdData {
    pub message_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSeenData {
    pub message_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SenderData {
    pub sender_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentFailedData {
    pub intent: String,
    pub code: String,
    pub message: String,
}

/// Events the server pushes to a live connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    ReceiveMessage(MessagePayload),
    MessageDeleted(MessageIdData),
    MessageSeen(MessageSeenData),
    MessageDelivered(MessageIdData),
    Typing(SenderData),
    StopTyping(SenderData),
    IntentFailed(IntentFailedData),
}

impl ServerEvent {
    pub fn receive(msg: &Message) -> Self {
        ServerEvent::ReceiveMessage(MessagePayload::from(msg))
    }

    pub fn deleted(message_id: i64) -> Self {
        ServerEvent::MessageDeleted(MessageIdData { message_id })
    }

    pub fn delivered(message_id: i64) -> Self {
        ServerEvent::MessageDelivered(MessageIdData { message_id })
    }

    pub fn seen(message_ids: Vec<i64>) -> Self {
        ServerEvent::MessageSeen(MessageSeenData { message_ids })
    }

    pub fn intent_failed(intent: &str, err: &AppError) -> Self {
        ServerEvent::IntentFailed(IntentFailedData {
            intent: intent.to_string(),
            code: err.code().to_string(),
            message: err.user_message(),
        })
    }

    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ReceiveMessage(_) => "receiveMessage",
            ServerEvent::MessageDeleted(_) => "messageDeleted",
            ServerEvent::MessageSeen(_) => "messageSeen",
            ServerEvent::MessageDelivered(_) => "messageDelivered",
            ServerEvent::Typing(_) => "typing",
            ServerEvent::StopTyping(_) => "stopTyping",
            ServerEvent::IntentFailed(_) => "intentFailed",
        }
    }
}

// endregion: --- Server Events

// region: --- REST Fallback

/// Query string for `GET /api/messages/{otherUserId}`.
///
/// Kept as a raw string so malformed ids degrade to an empty history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub current_user_id: Option<String>,
}

/// Body for `POST /api/messages/mark-seen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSeenRequest {
    pub user_id: i64,
    pub other_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkSeenResponse {
    pub success: bool,
}

// endregion: --- REST Fallback
