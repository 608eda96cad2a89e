//! # Database Store
//!
//! Connection pool, schema, and repository implementations for the identity
//! store and the message store.

// region: --- Modules
pub mod models;
pub mod schema;
pub mod user_repository;
pub mod message_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use message_repository::MessageRepository;
pub use schema::apply_schema;
pub use user_repository::UserRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a new SQLite connection pool, creating the database file if needed.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}
// endregion: --- Types and Functions

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory database with the schema applied.
    ///
    /// A single connection keeps every query on the same in-memory database.
    pub async fn setup_test_db() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        apply_schema(&pool).await.expect("Failed to apply schema");

        pool
    }
}
