//! Shared fixtures for handler and gateway tests.

use crate::server::AppState;
use lib_core::{apply_schema, AiConfig, Config, DbPool};
use sqlx::sqlite::SqlitePoolOptions;

pub const TEST_JWT_SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

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

/// Create test config
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration_hours: 24,
        flush_backlog_on_connect: true,
        discovery_limit: 10,
        ai: AiConfig::default(),
    }
}

pub async fn test_state(config: Config) -> AppState {
    let pool = setup_test_db().await;
    AppState::new(pool, config).expect("Failed to build app state")
}
