//! # Web Library
//!
//! HTTP handlers, the live chat gateway, middleware, and web services.

pub mod chat;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

#[cfg(test)]
mod test_support;

pub use server::{create_router, start_server, AppState, ServerConfig};
