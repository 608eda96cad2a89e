//! # User Repository
//!
//! Identity store access: profile lookups for the delivery engine, the advisory
//! live-connection column, and chat-partner derivation for the REST fallback.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{UserRepository, create_pool};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_pool("sqlite::memory:").await?;
//!
//! let user = UserRepository::create(&pool, "Alice", "555-1", "hashed_password").await?;
//! let found = UserRepository::find_by_phone(&pool, "555-1").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserForCreate};
use super::DbPool;
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Create a new user using `UserForCreate`.
    pub async fn create_with(
        pool: &DbPool,
        user_data: UserForCreate,
    ) -> Result<User, sqlx::Error> {
        Self::create(pool, &user_data.name, &user_data.phone, &user_data.password_hash).await
    }

    /// Create a new user in the database.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the phone is already registered (UNIQUE
    /// constraint violation) or the database connection fails.
    pub async fn create(
        pool: &DbPool,
        name: &str,
        phone: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (name, phone, password_hash) VALUES (?, ?, ?)"
        )
        .bind(name)
        .bind(phone)
        .bind(password_hash)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by the phone number used as their recipient address.
    pub async fn find_by_phone(pool: &DbPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
            .bind(phone.trim())
            .fetch_optional(pool)
            .await
    }

    /// Record (or clear, with `None`) the user's current live-connection handle.
    pub async fn update_live_connection(
        pool: &DbPool,
        id: i64,
        handle: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET live_connection = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        )
        .bind(handle)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Clear the live-connection handle only if it still equals `handle`.
    ///
    /// Returns `true` when a row was cleared. A newer connection's handle is left alone.
    pub async fn clear_live_connection_if(
        pool: &DbPool,
        id: i64,
        handle: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET live_connection = NULL, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND live_connection = ?
            "#
        )
        .bind(id)
        .bind(handle)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear every stored live-connection handle. Run at process start.
    pub async fn clear_all_live_connections(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET live_connection = NULL WHERE live_connection IS NOT NULL"
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Distinct counterparts of `user_id` across all messages, most recent activity first.
    pub async fn find_chat_partners(pool: &DbPool, user_id: i64) -> Result<Vec<User>, sqlx::Error> {
        query_as::<_, User>(
            r#"
            SELECT u.*
            FROM users u
            JOIN (
                SELECT
                    CASE WHEN sender_id = ? THEN receiver_id ELSE sender_id END AS partner_id,
                    MAX(created_at) AS last_at,
                    MAX(id) AS last_id
                FROM messages
                WHERE sender_id = ? OR receiver_id = ?
                GROUP BY partner_id
            ) p ON p.partner_id = u.id
            ORDER BY p.last_at DESC, p.last_id DESC
            "#
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// A bounded sample of users other than `user_id`, for discovery.
    pub async fn sample_others(
        pool: &DbPool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id != ? ORDER BY id ASC LIMIT ?")
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
