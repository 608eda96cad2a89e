//! # Chat Handlers
//!
//! REST fallback for clients that are refreshing or not connected.

// region: --- Modules
pub mod utils;
pub mod history;
pub mod partners;
pub mod seen;
// endregion: --- Modules

// region: --- Re-exports
pub use history::get_history;
pub use partners::get_chat_partners;
pub use seen::mark_seen;
// endregion: --- Re-exports
