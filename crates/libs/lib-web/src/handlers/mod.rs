//! # HTTP Request Handlers
//!
//! Axum handlers for everything outside the chat module, organized by feature.
//! The live connection and the REST fallback live in [`crate::chat`].
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: Identity endpoints
//!   - `POST /api/auth/register` - Create a new identity
//!   - `POST /api/auth/login` - Authenticate with phone/password
//!   - `GET /api/auth/find-by-phone/{phone}` - Resolve a phone to a user
//!
//! - **[`ai`]**: Persona chatbot proxy (bearer auth required)
//!   - `POST /api/ai/chat` - Next assistant turn for a client-held conversation
//!
//! ## Handler Architecture
//!
//! All handlers follow Axum's extractor pattern:
//!
//! ```rust,ignore
//! async fn handler(
//!     State(db): State<DbPool>,              // Shared state
//!     Extension(claims): Extension<Claims>,  // JWT auth
//!     Json(payload): Json<RequestBody>,      // Request body
//! ) -> Result<Json<Response>, AppError> {
//!     Ok(Json(response))
//! }
//! ```

pub mod ai;
pub mod auth;
