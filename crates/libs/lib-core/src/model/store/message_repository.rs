//! # Message Repository
//!
//! Durable message store. Every accepted message is written here before any
//! live emission, and receipt flags only ever move from false to true.
//!
//! Timestamps are assigned by the server at insert time.

use super::models::{Message, MessageForCreate};
use super::DbPool;
use lib_utils::now_utc;
use sqlx::query_as;

/// Message repository for database operations.
pub struct MessageRepository;

impl MessageRepository {
    /// Persist a new message and return the stored record.
    pub async fn create(pool: &DbPool, data: MessageForCreate) -> Result<Message, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_id, receiver_id, text, created_at, delivered, seen)
            VALUES (?, ?, ?, ?, ?, 0)
            "#
        )
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .bind(&data.text)
        .bind(now_utc())
        .bind(data.delivered)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Find a message by id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Message>, sqlx::Error> {
        query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently remove a message. Returns the number of rows removed.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// All messages exchanged between `a` and `b`, oldest first.
    pub async fn conversation(pool: &DbPool, a: i64, b: i64) -> Result<Vec<Message>, sqlx::Error> {
        query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_all(pool)
        .await
    }

    /// Mark every unseen message from `sender_id` to `receiver_id` as seen.
    ///
    /// Seen implies delivered, so both flags are set. Returns the ids that
    /// actually changed, ascending. A second call returns an empty list.
    pub async fn mark_seen_from(
        pool: &DbPool,
        receiver_id: i64,
        sender_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let mut ids: Vec<i64> = sqlx::query_scalar(
            r#"
            UPDATE messages
            SET seen = 1, delivered = 1
            WHERE sender_id = ? AND receiver_id = ? AND seen = 0
            RETURNING id
            "#
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_all(pool)
        .await?;

        ids.sort_unstable();
        Ok(ids)
    }

    /// Mark every undelivered message addressed to `receiver_id` as delivered
    /// and return them in send order.
    ///
    /// The update and the read happen in one statement, so two concurrent
    /// callers never both claim the same message.
    pub async fn claim_undelivered_for(
        pool: &DbPool,
        receiver_id: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let mut messages = query_as::<_, Message>(
            r#"
            UPDATE messages
            SET delivered = 1
            WHERE receiver_id = ? AND delivered = 0
            RETURNING *
            "#
        )
        .bind(receiver_id)
        .fetch_all(pool)
        .await?;

        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }
}
