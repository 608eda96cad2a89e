use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// User identity record.
///
/// `live_connection` mirrors the presence registry for observability only; it
/// can be stale and is never consulted for delivery decisions.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub live_connection: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data structure for creating a new user.
///
/// Password should be hashed before creating.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

impl UserForCreate {
    /// Create a new `UserForCreate` instance.
    pub fn new(name: String, phone: String, password_hash: String) -> Self {
        Self {
            name,
            phone,
            password_hash,
        }
    }
}

/// A message between two identities.
///
/// `delivered` and `seen` only ever move from false to true.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub delivered: bool,
    pub seen: bool,
}

impl Message {
    /// Whether `user_id` is the sender or the receiver.
    pub fn involves(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other participant from `user_id`'s point of view.
    pub fn counterpart_of(&self, user_id: i64) -> i64 {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

/// Data structure for creating a new message.
#[derive(Debug, Clone)]
pub struct MessageForCreate {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: String,
    /// Recipient was present when the message was accepted.
    pub delivered: bool,
}
