//! # Authentication Handlers
//!
//! HTTP request handlers for identity endpoints.
//!
//! ## Overview
//!
//! - Registration with name, phone and password
//! - Login by phone and password
//! - JWT issuance (the same token authenticates the live connection)
//! - Phone lookup used to start a new conversation
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::{get, post}};
//! use lib_web::handlers::auth::{register, login, find_by_phone};
//!
//! let app = Router::new()
//!     .route("/api/auth/register", post(register))
//!     .route("/api/auth/login", post(login))
//!     .route("/api/auth/find-by-phone/{phone}", get(find_by_phone));
//! ```

use crate::chat::PresenceRegistry;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use lib_auth::{encode_jwt, hash_password, verify_password};
use lib_core::model::store::models::User;
use lib_core::model::store::UserRepository;
use lib_core::{
    dto::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest, UserInfo, UserSummary},
    Config, DbPool,
};
use lib_utils::{validate_max_length, validate_not_empty, validate_phone};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Maximum display name length.
pub const MAX_NAME_LENGTH: usize = 64;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, error: impl Into<String>) -> HandlerError {
    (status, Json(ErrorResponse::new(error)))
}

fn issue_token(user: &User, config: &Config) -> Result<String, HandlerError> {
    encode_jwt(user.id, user.name.clone(), &config.jwt_secret, config.jwt_expiration_hours).map_err(|e| {
        error!("[AUTH] JWT encoding failed: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate token")
    })
}

/// Register handler - creates a new identity.
///
/// # Returns
///
/// * `Ok((StatusCode::CREATED, AuthResponse))` - User created with a JWT token
/// * `Err((StatusCode, ErrorResponse))` - Validation error, duplicate phone, or server error
///
/// # Validation
///
/// - Name must be non-empty and at most [`MAX_NAME_LENGTH`] characters
/// - Phone must be a valid phone number and unique
/// - Password must be at least 8 characters (validated in `hash_password`)
#[instrument(skip(pool, config, req), fields(phone = %req.phone))]
pub async fn register(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HandlerError> {
    info!("[REGISTER] New registration request");

    let name = req.name.trim();
    let phone = req.phone.trim();

    validate_not_empty(name, "Name")
        .and_then(|_| validate_max_length(name, MAX_NAME_LENGTH, "Name"))
        .map_err(|e| {
            warn!("[REGISTER] Invalid name: {}", e);
            reject(StatusCode::BAD_REQUEST, e)
        })?;

    validate_phone(phone).map_err(|e| {
        warn!("[REGISTER] Invalid phone: {}", e);
        reject(StatusCode::BAD_REQUEST, e)
    })?;

    match UserRepository::find_by_phone(&pool, phone).await {
        Ok(Some(_)) => {
            warn!("[REGISTER] Phone already registered: {}", phone);
            return Err(reject(StatusCode::CONFLICT, "Phone already registered"));
        }
        Ok(None) => {}
        Err(e) => {
            error!("[REGISTER] Database error checking phone: {}", e);
            return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Database error"));
        }
    }

    debug!("[REGISTER] Hashing password...");
    let password_hash = hash_password(&req.password).map_err(|e| {
        warn!("[REGISTER] Password hashing failed: {}", e);
        reject(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let user = match UserRepository::create(&pool, name, phone, &password_hash).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            warn!("[REGISTER] Phone registered concurrently: {}", phone);
            return Err(reject(StatusCode::CONFLICT, "Phone already registered"));
        }
        Err(e) => {
            error!("[REGISTER] Failed to create user: {}", e);
            return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user"));
        }
    };

    let token = issue_token(&user, &config)?;

    info!(user_id = user.id, "[REGISTER] User created and authenticated");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
            message: "Registration successful".to_string(),
        }),
    ))
}

/// Login handler - authenticates an existing identity by phone and password.
///
/// Unknown phone and wrong password both answer `401 Invalid credentials`.
#[instrument(skip(pool, config, req), fields(phone = %req.phone))]
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HandlerError> {
    info!("[LOGIN] Login attempt");

    let user = match UserRepository::find_by_phone(&pool, &req.phone).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("[LOGIN] User not found");
            return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!("[LOGIN] Database error: {}", e);
            return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Database error"));
        }
    };

    debug!("[LOGIN] Verifying password...");
    let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        error!("[LOGIN] Password verification error: {}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;

    if !is_valid {
        warn!(user_id = user.id, "[LOGIN] Invalid password");
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let token = issue_token(&user, &config)?;

    info!(user_id = user.id, "[LOGIN] User authenticated");

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
            message: "Login successful".to_string(),
        }),
    ))
}

/// Look up a user by phone number.
///
/// **Route**: `GET /api/auth/find-by-phone/{phone}`
pub async fn find_by_phone(
    State(pool): State<DbPool>,
    State(presence): State<Arc<PresenceRegistry>>,
    Path(phone): Path<String>,
) -> Result<Json<UserSummary>, HandlerError> {
    match UserRepository::find_by_phone(&pool, &phone).await {
        Ok(Some(user)) => {
            let online = presence.is_online(user.id).await;
            Ok(Json(UserSummary::from_user(&user, online)))
        }
        Ok(None) => Err(reject(StatusCode::NOT_FOUND, "User not found")),
        Err(e) => {
            error!("[AUTH] Database error looking up phone: {}", e);
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))
        }
    }
}

#[cfg(test)]
mod tests;
