//! # Core Library
//!
//! Core models, message and identity stores, wire DTOs, configuration, and errors.

pub mod config;
pub mod error;
pub mod model;
pub mod dto;

// Re-export commonly used types
pub use config::{AiConfig, Config};
pub use error::{AppError, Result};
pub use model::store::{DbPool, create_pool, apply_schema};
