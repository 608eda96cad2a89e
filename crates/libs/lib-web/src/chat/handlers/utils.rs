//! # Chat Handler Utilities
//!
//! Shared helper functions for chat handlers.

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use lib_auth::decode_jwt;
use lib_core::Config;
use tracing::warn;

/// Pick the credential token from `?token=` or an `Authorization: Bearer` header.
///
/// The query parameter wins because browsers cannot set headers on a WebSocket upgrade.
pub fn extract_token<'a>(headers: &'a HeaderMap, query_token: Option<&'a str>) -> Option<&'a str> {
    query_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::trim)
        })
}

/// Helper to extract the user id from a JWT token
pub fn authenticate(token: Option<&str>, config: &Config) -> Result<i64, StatusCode> {
    let token = token.ok_or_else(|| {
        warn!("[AUTH] Missing credential token");
        StatusCode::UNAUTHORIZED
    })?;

    let claims = decode_jwt(token, &config.jwt_secret).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    claims.user_id().map_err(|e| {
        warn!("[AUTH] {}", e);
        StatusCode::UNAUTHORIZED
    })
}

/// Parse a user id from a path or query segment.
pub fn parse_user_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
