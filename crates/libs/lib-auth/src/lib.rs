//! # Authentication Library
//!
//! Password hashing and the signed credential tokens consumed by the connection gateway.

pub mod error;
pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use error::{Error, Result};
pub use pwd::{hash_password, verify_password};
pub use token::{Claims, encode_jwt, decode_jwt};
