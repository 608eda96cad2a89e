//! # Authentication Middleware
//!
//! Validates the `Authorization: Bearer <token>` header and injects the decoded
//! [`Claims`](lib_auth::Claims) into the request extensions.
//!
//! The signing secret comes from the router state, so the layer is built with
//! `from_fn_with_state`:
//!
//! ```rust,ignore
//! use axum::{middleware, routing::post, Router};
//! use lib_web::middleware::require_auth;
//!
//! let protected = Router::new()
//!     .route("/api/ai/chat", post(handler))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! Handlers then extract `Extension<Claims>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use lib_auth::decode_jwt;
use lib_core::Config;
use tracing::{debug, warn};

/// Authentication middleware that validates JWT tokens.
///
/// - **Valid token**: continues with `Claims` in extensions
/// - **Missing/invalid/expired token**: `401 Unauthorized`
pub async fn require_auth(
    State(config): State<Config>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            StatusCode::UNAUTHORIZED
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            warn!("[AUTH] Invalid Authorization header format");
            StatusCode::UNAUTHORIZED
        })?;

    let claims = decode_jwt(token, &config.jwt_secret)
        .map_err(|e| {
            warn!("[AUTH] JWT validation failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    debug!("[AUTH] Authenticated user: {} (id: {})", claims.name, claims.sub);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
