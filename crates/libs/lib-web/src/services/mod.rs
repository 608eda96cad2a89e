//! # Services Layer
//!
//! Integrations with external APIs, kept apart from the HTTP handlers:
//!
//! ```text
//! Handlers (HTTP) → Services → External APIs
//! ```
//!
//! - [`ai`] - OpenAI-compatible chat-completion proxy with persona prompts
//!
//! Services return `Result<T, AppError>` and map transport failures to
//! [`AppError::Upstream`](lib_core::AppError::Upstream).

pub mod ai;

pub use ai::{AiService, Persona};
