//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! - `BIND_ADDRESS`: listen address (default `127.0.0.1:3001`)
//! - `ALLOWED_ORIGINS`: comma-separated CORS origins (defaults to local dev servers)

use lib_utils::get_env_or;
use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let defaults = ServerConfig::default();

    let allowed_origins = match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) => origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect(),
        Err(_) => defaults.allowed_origins,
    };

    let config = ServerConfig {
        bind_address: get_env_or("BIND_ADDRESS", &defaults.bind_address),
        allowed_origins,
    };

    start_server(config).await
}
