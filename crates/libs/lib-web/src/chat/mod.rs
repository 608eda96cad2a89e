//! # Chat Module
//!
//! Real-time one-to-one messaging over a persistent WebSocket connection.
//!
//! - [`gateway`]: authenticates upgrades and runs one reader/writer pair per connection
//! - [`engine`]: applies send, delete, mark-seen and typing intents
//! - [`presence`]: which users currently have a live connection
//! - [`handlers`]: stateless REST fallback for history, partners and mark-seen

pub mod engine;
pub mod gateway;
pub mod handlers;
pub mod presence;
pub mod state;

pub use engine::DeliveryEngine;
pub use gateway::chat_websocket;
pub use handlers::{get_chat_partners, get_history, mark_seen};
pub use presence::{ConnectionHandle, PresenceRegistry};
pub use state::ChatAppState;

#[cfg(test)]
mod tests;
