//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the authentication endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/auth/register` - [`RegisterRequest`] -> [`AuthResponse`]
//! - `POST /api/auth/login` - [`LoginRequest`] -> [`AuthResponse`]
//! - `GET /api/auth/find-by-phone/{phone}` -> [`UserSummary`]
//!
//! ## Wire Format
//!
//! Field names are **camelCase** in JSON, matching the live-connection events.
//!
//! ```text
//! POST /api/auth/login
//! Content-Type: application/json
//!
//! { "phone": "555-1", "password": "MyPassword123!" }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "user": { "id": 1, "name": "Alice", "phone": "555-1", "createdAt": "2024-01-01T00:00:00.000Z" },
//!   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!   "message": "Login successful"
//! }
//! ```

use crate::model::store::models::User;
use lib_utils::format_time;
use serde::{Deserialize, Serialize};

/// Login request.
///
/// The phone number doubles as the login identifier since it is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Registration request for a new identity.
///
/// # Validation Rules (Server-Side)
///
/// - Name must be non-empty, at most 64 characters
/// - Phone must be a valid phone number and not already registered
/// - Password must be at least 8 characters
///
/// # Security Note
///
/// Password is sent in plaintext over HTTPS. Server immediately hashes it using Argon2.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Authentication response returned on successful login or registration.
///
/// The `token` field should be included in subsequent requests as
/// `Authorization: Bearer <token>`, or as `?token=` on the live-connection upgrade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
    pub message: String,
}

/// User information (public, safe to send to client).
///
/// Never includes the password hash or the live-connection handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            created_at: format_time(user.created_at),
        }
    }
}

/// Chat-partner entry returned by the REST fallback and phone lookup.
///
/// `online` reflects the in-memory presence registry at the time of the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub online: bool,
}

impl UserSummary {
    pub fn from_user(user: &User, online: bool) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            online,
        }
    }
}

/// Standard error response for the authentication endpoints.
///
/// # JSON Example
///
/// ```json
/// { "error": "Invalid phone or password" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
