//! # Chat State Management
//!
//! Shared state for the gateway and the REST fallback: the store, the presence
//! registry, and the delivery engine built on both.

use crate::chat::engine::DeliveryEngine;
use crate::chat::presence::PresenceRegistry;
use lib_core::{Config, DbPool};
use std::sync::Arc;

/// Application state for chat module
pub struct ChatAppState {
    pub db: DbPool,
    pub config: Config,
    pub presence: Arc<PresenceRegistry>,
    pub engine: DeliveryEngine,
}

impl ChatAppState {
    /// Build the chat state with an empty presence registry.
    pub fn new(db: DbPool, config: Config) -> Self {
        let presence = Arc::new(PresenceRegistry::new());
        let engine = DeliveryEngine::new(db.clone(), presence.clone());
        Self {
            db,
            config,
            presence,
            engine,
        }
    }
}
