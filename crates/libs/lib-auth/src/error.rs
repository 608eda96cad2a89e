//! # Authentication Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to encode JWT: {0}")]
    TokenEncode(String),

    /// Bad signature, expired, or structurally invalid token.
    #[error("Failed to decode JWT: {0}")]
    TokenInvalid(String),

    /// Token verified but its subject is not an identity id.
    #[error("Token subject is not a user id: {0}")]
    MalformedSubject(String),
}
