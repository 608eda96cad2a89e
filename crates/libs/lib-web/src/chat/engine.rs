//! # Delivery Engine
//!
//! Applies the intents received on a live connection: persist first, then emit
//! to whichever parties are present.
//!
//! ```text
//! created ──> delivered ──> seen
//!    └───────────┴───────────┴──> deleted
//! ```
//!
//! Every emit goes through the [`PresenceRegistry`], which only enqueues; the
//! engine never waits on a socket.

use crate::chat::presence::PresenceRegistry;
use lib_core::dto::{ClientEvent, SenderData, ServerEvent};
use lib_core::model::store::models::{Message, MessageForCreate};
use lib_core::model::store::{MessageRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct DeliveryEngine {
    db: DbPool,
    presence: Arc<PresenceRegistry>,
}

impl DeliveryEngine {
    pub fn new(db: DbPool, presence: Arc<PresenceRegistry>) -> Self {
        Self { db, presence }
    }

    /// Route a decoded intent from `user_id`'s connection.
    pub async fn handle(&self, user_id: i64, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::SendMessage(data) => {
                self.send(user_id, &data.receiver_phone, &data.text).await?;
            }
            ClientEvent::DeleteMessage(data) => {
                self.delete(user_id, data.message_id).await?;
            }
            ClientEvent::MarkSeen(data) => {
                self.mark_seen(user_id, data.other_user_id).await?;
            }
            ClientEvent::Typing(data) => self.typing(user_id, data.receiver_id).await,
            ClientEvent::StopTyping(data) => self.stop_typing(user_id, data.receiver_id).await,
        }
        Ok(())
    }

    /// Accept a message for the user owning `receiver_phone`.
    ///
    /// The stored message is echoed to the sender. If the recipient is present it
    /// is pushed to them as well and the sender gets `messageDelivered`.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn send(&self, sender_id: i64, receiver_phone: &str, text: &str) -> Result<Message> {
        let receiver = UserRepository::find_by_phone(&self.db, receiver_phone)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user with phone {}", receiver_phone.trim())))?;

        let recipient = self.presence.lookup(receiver.id).await;

        let message = MessageRepository::create(
            &self.db,
            MessageForCreate {
                sender_id,
                receiver_id: receiver.id,
                text: text.to_string(),
                delivered: recipient.is_some(),
            },
        )
        .await?;

        info!(
            message_id = message.id,
            sender_id,
            receiver_id = receiver.id,
            delivered = message.delivered,
            "[CHAT] message accepted"
        );

        let self_addressed = receiver.id == sender_id;
        if let Some(handle) = &recipient {
            if !self_addressed {
                handle.send(ServerEvent::receive(&message));
            }
        }

        self.presence.emit(sender_id, ServerEvent::receive(&message)).await;

        if message.delivered {
            self.presence.emit(sender_id, ServerEvent::delivered(message.id)).await;
        }

        Ok(message)
    }

    /// Hard-delete a message the requester sent or received.
    ///
    /// Unknown ids are a no-op. Returns whether a message was removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, requester_id: i64, message_id: i64) -> Result<bool> {
        let Some(message) = MessageRepository::find_by_id(&self.db, message_id).await? else {
            debug!(message_id, "[CHAT] delete of unknown message ignored");
            return Ok(false);
        };

        if !message.involves(requester_id) {
            return Err(AppError::Forbidden(
                "Only the sender or receiver can delete a message".to_string(),
            ));
        }

        if MessageRepository::delete(&self.db, message_id).await? == 0 {
            // Removed concurrently by the counterpart
            return Ok(false);
        }

        info!(message_id, requester_id, "[CHAT] message deleted");

        let counterpart = message.counterpart_of(requester_id);
        if counterpart != requester_id {
            self.presence.emit(counterpart, ServerEvent::deleted(message_id)).await;
        }
        self.presence.emit(requester_id, ServerEvent::deleted(message_id)).await;

        Ok(true)
    }

    /// Mark everything `other_user_id` sent to `current_user_id` as seen.
    ///
    /// Returns the ids that changed. The sender is notified only when that list
    /// is non-empty, so repeating the call is silent.
    #[instrument(skip(self))]
    pub async fn mark_seen(&self, current_user_id: i64, other_user_id: i64) -> Result<Vec<i64>> {
        let ids = MessageRepository::mark_seen_from(&self.db, current_user_id, other_user_id).await?;

        if ids.is_empty() {
            return Ok(ids);
        }

        info!(count = ids.len(), current_user_id, other_user_id, "[CHAT] messages seen");
        self.presence.emit(other_user_id, ServerEvent::seen(ids.clone())).await;

        Ok(ids)
    }

    pub async fn typing(&self, sender_id: i64, receiver_id: i64) {
        self.presence
            .emit(receiver_id, ServerEvent::Typing(SenderData { sender_id }))
            .await;
    }

    pub async fn stop_typing(&self, sender_id: i64, receiver_id: i64) {
        self.presence
            .emit(receiver_id, ServerEvent::StopTyping(SenderData { sender_id }))
            .await;
    }

    /// Push every undelivered message addressed to `user_id` and mark it delivered.
    ///
    /// Each original sender that is present gets `messageDelivered`.
    #[instrument(skip(self))]
    pub async fn flush_backlog(&self, user_id: i64) -> Result<usize> {
        let pending = MessageRepository::claim_undelivered_for(&self.db, user_id).await?;

        for message in &pending {
            self.presence.emit(user_id, ServerEvent::receive(message)).await;
            if message.sender_id != user_id {
                self.presence
                    .emit(message.sender_id, ServerEvent::delivered(message.id))
                    .await;
            }
        }

        if !pending.is_empty() {
            info!(user_id, count = pending.len(), "[CHAT] backlog flushed");
        }

        Ok(pending.len())
    }
}
